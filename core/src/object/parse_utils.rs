/// If `line` starts with `name` followed by a space, returns the rest of the line.
pub(crate) fn header<'a>(line: &'a [u8], name: &[u8]) -> Option<&'a [u8]> {
    if line.contains(&b' ') {
        let (maybe_name, value) = split_once(line, &b' ');
        if maybe_name == name {
            Some(value)
        } else {
            None
        }
    } else {
        None
    }
}

pub(crate) fn split_once<'a>(s: &'a [u8], c: &u8) -> (&'a [u8], &'a [u8]) {
    match s.iter().position(|b| b == c) {
        Some(n) => (&s[0..n], &s[n + 1..]),
        None => (s, &[]),
    }
}

pub(crate) fn rsplit_once<'a>(s: &'a [u8], c: &u8) -> Option<(&'a [u8], &'a [u8])> {
    s.iter()
        .rposition(|b| b == c)
        .map(|n| (&s[0..n], &s[n + 1..]))
}

/// Parses an unsigned decimal number with no sign, padding, or separators.
pub(crate) fn parse_decimal(s: &[u8]) -> Option<u64> {
    if s.is_empty() || s.len() > 19 || !s.iter().all(u8::is_ascii_digit) {
        return None;
    }

    Some(
        s.iter()
            .fold(0u64, |acc, d| acc * 10 + u64::from(d - b'0')),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_fn() {
        assert_eq!(header(b"tree abc", b"tree").unwrap(), b"abc");
        assert_eq!(header(b"tree ", b"tree").unwrap(), b"");

        assert_eq!(header(b"trex abc", b"tree"), None);
        assert_eq!(header(b"tree", b"tree"), None);
        assert_eq!(header(b"treex abc", b"tree"), None);
    }

    #[test]
    fn split_fns() {
        assert_eq!(split_once(b"a b c", &b' '), (&b"a"[..], &b"b c"[..]));
        assert_eq!(split_once(b"abc", &b' '), (&b"abc"[..], &b""[..]));

        assert_eq!(
            rsplit_once(b"a b c", &b' '),
            Some((&b"a b"[..], &b"c"[..]))
        );
        assert_eq!(rsplit_once(b"abc", &b' '), None);
    }

    #[test]
    fn parse_decimal_fn() {
        assert_eq!(parse_decimal(b"0"), Some(0));
        assert_eq!(parse_decimal(b"1234567890"), Some(1234567890));
        assert_eq!(parse_decimal(b""), None);
        assert_eq!(parse_decimal(b"+5"), None);
        assert_eq!(parse_decimal(b"12a"), None);
    }
}
