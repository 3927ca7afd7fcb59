use std::{fs, process::Command};

mod common;

#[test]
fn init_matches_command_line_git() {
    common::compare_git_and_oxgit(|cmd, path| {
        let output = Command::new(cmd)
            .current_dir(path)
            .args(&["init", "repo"])
            .output()
            .unwrap();
        assert!(output.status.success());

        // These vary between git versions and aren't written by oxgit.
        let git_dir = path.join("repo/.git");
        fs::remove_dir_all(git_dir.join("branches")).unwrap_or(());
        fs::remove_dir_all(git_dir.join("hooks")).unwrap();
        fs::create_dir(git_dir.join("hooks")).unwrap();
        fs::write(git_dir.join("HEAD"), "ref: refs/heads/master\n").unwrap();

        let config = fs::read_to_string(git_dir.join("config")).unwrap();
        assert!(config.contains("repositoryformatversion = 0"));
        fs::remove_file(git_dir.join("config")).unwrap();
        fs::remove_file(git_dir.join("description")).unwrap();
        fs::remove_dir_all(git_dir.join("info")).unwrap();
    });
}

#[test]
fn objects_dir_has_two_subdirs() {
    common::compare_git_and_oxgit(|cmd, path| {
        Command::new(cmd)
            .current_dir(path)
            .args(&["init", "repo"])
            .output()
            .unwrap();

        let objects_dir = path.join("repo/.git/objects");
        assert!(objects_dir.is_dir());

        let mut names: Vec<String> = fs::read_dir(&objects_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["info", "pack"]);

        // Leave only the objects dir behind for the comparison.
        let repo = path.join("repo");
        for entry in fs::read_dir(repo.join(".git")).unwrap() {
            let entry = entry.unwrap();
            if entry.file_name() != "objects" {
                let p = entry.path();
                if p.is_dir() {
                    fs::remove_dir_all(p).unwrap();
                } else {
                    fs::remove_file(p).unwrap();
                }
            }
        }
    });
}
