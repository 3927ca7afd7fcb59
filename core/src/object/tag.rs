use super::parse_utils::{header, split_once};
use super::{Attribution, Id, Kind};

/// Check the header block of an annotated tag's payload.
///
/// A tag starts with `object`, `type`, and `tag` lines, in that order,
/// optionally followed by a `tagger` line. Nothing else is interpreted;
/// tags are otherwise stored as opaque payloads.
pub fn tag_is_valid(payload: &[u8]) -> bool {
    let (object, rest) = split_once(payload, &b'\n');
    match header(object, b"object") {
        Some(id) if Id::from_hex(id).is_ok() => (),
        _ => return false,
    }

    let (kind, rest) = split_once(rest, &b'\n');
    match header(kind, b"type") {
        Some(kind) if Kind::from_bytes(kind).is_some() => (),
        _ => return false,
    }

    let (name, rest) = split_once(rest, &b'\n');
    match header(name, b"tag") {
        Some(name) if !name.is_empty() => (),
        _ => return false,
    }

    let (tagger, _) = split_once(rest, &b'\n');
    match header(tagger, b"tagger") {
        Some(tagger) => Attribution::parse(tagger).is_some(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBJECT: &str = "object be9bfa841874ccc9f2ef7c48d0c76226f89b7189\n";

    #[test]
    fn valid() {
        let tag = format!(
            "{}type commit\ntag test-tag\ntagger A. U. Thor <tagger@localhost> 1 +0000\n\nmessage\n",
            OBJECT
        );
        assert!(tag_is_valid(tag.as_bytes()));

        let no_tagger = format!("{}type commit\ntag test-tag\n\nmessage\n", OBJECT);
        assert!(tag_is_valid(no_tagger.as_bytes()));
    }

    #[test]
    fn invalid_object() {
        assert!(!tag_is_valid(b""));
        assert!(!tag_is_valid(
            b"object\tbe9bfa841874ccc9f2ef7c48d0c76226f89b7189\ntype commit\ntag t\n"
        ));
        assert!(!tag_is_valid(
            b"obejct be9bfa841874ccc9f2ef7c48d0c76226f89b7189\ntype commit\ntag t\n"
        ));
        assert!(!tag_is_valid(
            b"object zz9bfa841874ccc9f2ef7c48d0c76226f89b7189\ntype commit\ntag t\n"
        ));
        assert!(!tag_is_valid(b"object be9\ntype commit\ntag t\n"));
    }

    #[test]
    fn invalid_type_and_name() {
        assert!(!tag_is_valid(OBJECT.as_bytes()));
        assert!(!tag_is_valid(format!("{}type\tcommit\ntag t\n", OBJECT).as_bytes()));
        assert!(!tag_is_valid(format!("{}type bogus\ntag t\n", OBJECT).as_bytes()));
        assert!(!tag_is_valid(format!("{}type commit\n", OBJECT).as_bytes()));
        assert!(!tag_is_valid(format!("{}type commit\ntag \n", OBJECT).as_bytes()));
    }

    #[test]
    fn invalid_tagger() {
        let tag = format!("{}type commit\ntag t\ntagger nobody\n", OBJECT);
        assert!(!tag_is_valid(tag.as_bytes()));
    }
}
