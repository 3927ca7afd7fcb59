use oxgit_core::commit_graph::create_commit;
use oxgit_core::object::{Attribution, Commit};
use oxgit_core::repo::Result;

use super::OnDisk;

impl OnDisk {
    /// Commit the current index on the current branch.
    ///
    /// Analogous to [`git commit`](https://git-scm.com/docs/git-commit)
    /// without `-a`.
    pub fn commit(
        &self,
        author: &Attribution,
        committer: &Attribution,
        message: &str,
    ) -> Result<Commit> {
        let index = self.read_index()?;
        create_commit(self, &index, author, committer, message)
    }
}
