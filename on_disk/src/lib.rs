//! This crate provides a git repository that stores content on the local file system.
//!
//! **IMPORTANT NOTE:** This is intended as a reference implementation largely
//! for testing purposes and may not necessarily handle all of the edge cases that
//! the traditional `git` command-line interface will handle.
//!
//! That said, it does intentionally use the same `.git` folder format as
//! command-line git so that results may be compared for similar operations.
//! Loose objects, packs, refs, and the index written by either tool can be
//! read by the other.

#![deny(warnings)]

mod on_disk_repo;
pub use on_disk_repo::{load_pack, OnDisk};

mod status;
pub use status::{Change, Status};

mod temp_git_repo;
pub use temp_git_repo::TempGitRepo;

mod worktree;
pub use worktree::{WorkFile, WorkTree};
