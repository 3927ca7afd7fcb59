use std::{
    env,
    path::{Path, PathBuf},
};

// Switches the process's working directory until dropped, then switches back.
//
// Commands discover their repository from the working directory, so tests
// that run them in-process use this. The working directory is shared by the
// whole process: mark every such test #[serial].
pub(crate) struct TempCwd {
    old_path: PathBuf,
}

impl TempCwd {
    pub fn new<P: AsRef<Path>>(path: P) -> TempCwd {
        let old_path = env::current_dir().unwrap();
        env::set_current_dir(path).unwrap();

        TempCwd { old_path }
    }
}

impl Drop for TempCwd {
    fn drop(&mut self) {
        env::set_current_dir(&self.old_path).unwrap();
    }
}
