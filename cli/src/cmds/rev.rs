use oxgit_core::{
    object::Id,
    repo::{check_ref_name, Error, RefStore, Repo, BRANCH_PREFIX},
};

use super::usage_error;
use crate::Result;

/// Turn a name given on the command line into an object ID.
///
/// Accepts a full 40-digit ID, `HEAD`, a full ref name, or a branch or tag
/// name. Abbreviated IDs are not supported.
pub(crate) fn resolve<R: Repo + RefStore>(repo: &R, name: &str) -> Result<Id> {
    if name == "HEAD" {
        return match repo.head_id()? {
            Some(id) => Ok(id),
            None => Err(not_valid(name)),
        };
    }

    if name.len() == 40 {
        if let Ok(id) = Id::from_hex(name) {
            return Ok(id);
        }
    }

    for full in ref_candidates(name) {
        if check_ref_name(&full).is_err() {
            continue;
        }
        if let Some(id) = repo.read_ref(&full)? {
            return Ok(id);
        }
    }

    Err(not_valid(name))
}

/// Like [`resolve`], but also checks that the object is present.
pub(crate) fn resolve_existing<R: Repo + RefStore>(repo: &R, name: &str) -> Result<Id> {
    let id = resolve(repo, name)?;
    if repo.has_object(&id)? {
        Ok(id)
    } else {
        Err(Box::new(Error::ObjectNotFound(id)))
    }
}

/// Expand a branch name to its full ref name; full names pass through.
pub(crate) fn branch_ref(name: &str) -> String {
    if name.starts_with("refs/") {
        name.to_string()
    } else {
        format!("{}{}", BRANCH_PREFIX, name)
    }
}

fn ref_candidates(name: &str) -> Vec<String> {
    if name.starts_with("refs/") {
        vec![name.to_string()]
    } else {
        vec![
            format!("refs/tags/{}", name),
            format!("{}{}", BRANCH_PREFIX, name),
            format!("refs/remotes/{}", name),
        ]
    }
}

fn not_valid(name: &str) -> Box<dyn std::error::Error> {
    usage_error(format!("not a valid object name: '{}'", name))
}
