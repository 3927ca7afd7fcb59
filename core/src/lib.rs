//! This crate implements the core data model for an abstract git repository:
//! object identity and encoding, pack files, the staging area ("index") format,
//! tree construction from the staging area, and commit history traversal.
//!
//! Nothing in this crate knows where a repository lives. Storage is reached
//! through the [`repo::Repo`] and [`repo::RefStore`] traits; see the
//! `oxgit_on_disk` crate for the implementation backed by a `.git` directory.

pub mod codec;
pub mod commit_graph;
pub mod index;
pub mod object;
pub mod pack;
pub mod path;
pub mod repo;
pub mod tree_builder;

#[cfg(test)]
pub(crate) mod test_support;
