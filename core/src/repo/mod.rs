//! Represents an abstract git repository.
//!
//! ## Design Goals
//!
//! Oxgit intends to allow repositories to be stored in multiple different mechanisms.
//! The `oxgit_on_disk` crate provides local `.git` directories; [`MemoryRepo`]
//! keeps everything in memory, which is mostly useful for tests.
//!
//! Everything above this layer (tree building, commit creation, history
//! walks) is written against the [`Repo`] and [`RefStore`] traits only.

use std::collections::BTreeMap;

use crate::object::{Id, Object};

mod error;
pub use error::{Error, Result};

mod memory;
pub use memory::MemoryRepo;

mod ref_name;
pub use ref_name::{branch_name, check_ref_name, BRANCH_PREFIX};

/// A struct that implements the `Repo` trait represents a particular mechanism
/// for storing and accessing git objects.
///
/// Implementations must be safe to write from several threads at once:
/// sibling trees of a new commit are written concurrently.
pub trait Repo {
    /// Store an object under its ID.
    ///
    /// Writing an object that is already present is a successful no-op.
    fn put_object(&self, object: &Object) -> Result<()>;

    /// Fetch an object, verifying that its content hashes to `id`.
    ///
    /// Fails with [`Error::ObjectNotFound`] if no such object is stored.
    fn get_object(&self, id: &Id) -> Result<Object>;

    /// Returns true if an object with this ID is stored. Does not decode it.
    fn has_object(&self, id: &Id) -> Result<bool>;
}

/// Maps branch and tag names to commit IDs and tracks the current branch.
///
/// All ref names are full names (`refs/heads/master`), checked with
/// [`check_ref_name`].
pub trait RefStore {
    /// The ref `HEAD` points to, e.g. `refs/heads/master`. The ref itself
    /// need not exist yet.
    fn current_ref(&self) -> Result<String>;

    /// Returns the ID a ref points to, or `None` if the ref doesn't exist.
    fn read_ref(&self, name: &str) -> Result<Option<Id>>;

    /// Create or move a ref.
    fn update_ref(&self, name: &str, id: &Id) -> Result<()>;

    /// Point `HEAD` at another ref.
    fn update_current_ref(&self, name: &str) -> Result<()>;

    /// Fails with [`Error::RefNotFound`] if the ref doesn't exist.
    fn delete_ref(&self, name: &str) -> Result<()>;

    /// All branches by full ref name; remote-tracking branches
    /// (`refs/remotes/...`) only if `include_remote` is set.
    fn branch_refs(&self, include_remote: bool) -> Result<BTreeMap<String, Id>>;

    /// Resolves `HEAD` to a commit ID, or `None` on an unborn branch.
    fn head_id(&self) -> Result<Option<Id>> {
        let current = self.current_ref()?;
        self.read_ref(&current)
    }
}
