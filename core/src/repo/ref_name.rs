use super::{Error, Result};

pub const BRANCH_PREFIX: &str = "refs/heads/";

const ALLOWED_PREFIXES: &[&str] = &[BRANCH_PREFIX, "refs/tags/", "refs/remotes/"];

/// Check that `name` is a full ref name under `refs/heads/`, `refs/tags/`,
/// or `refs/remotes/` and follows git's naming rules.
pub fn check_ref_name(name: &str) -> Result<()> {
    let invalid = || Err(Error::InvalidRefName(name.to_string()));

    let rest = match ALLOWED_PREFIXES.iter().find(|p| name.starts_with(*p)) {
        Some(prefix) => &name[prefix.len()..],
        None => return invalid(),
    };

    if rest.is_empty() || name.ends_with('/') || name.ends_with('.') || name.contains("..") {
        return invalid();
    }

    if name.contains("@{") || name.contains("//") {
        return invalid();
    }

    if name
        .chars()
        .any(|c| c.is_ascii_control() || " ~^:?*[\\".contains(c))
    {
        return invalid();
    }

    if rest
        .split('/')
        .any(|part| part.starts_with('.') || part.ends_with(".lock"))
    {
        return invalid();
    }

    Ok(())
}

/// Strips `refs/heads/` from a branch ref, if present.
pub fn branch_name(name: &str) -> &str {
    name.strip_prefix(BRANCH_PREFIX).unwrap_or(name)
}
