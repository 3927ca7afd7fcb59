use super::super::*;

use crate::TempGitRepo;

use oxgit_core::repo::RefStore;

fn blob_id(content: &str) -> Id {
    Object::blob(content.as_bytes().to_vec()).id()
}

#[test]
fn loose_refs() {
    let temp = tempfile::tempdir().unwrap();
    let r = OnDisk::init(temp.path()).unwrap();
    let id = blob_id("one");

    assert_eq!(r.current_ref().unwrap(), "refs/heads/master");
    assert_eq!(r.head_id().unwrap(), None);
    assert_eq!(r.read_ref("refs/heads/master").unwrap(), None);

    r.update_ref("refs/heads/master", &id).unwrap();
    assert_eq!(
        fs::read_to_string(temp.path().join(".git/refs/heads/master")).unwrap(),
        format!("{}\n", id)
    );
    assert_eq!(r.head_id().unwrap(), Some(id));

    r.update_ref("refs/heads/feature/nested", &id).unwrap();
    r.update_ref("refs/remotes/origin/master", &id).unwrap();
    r.update_ref("refs/tags/v1.0", &id).unwrap();

    let branches: Vec<String> = r.branch_refs(false).unwrap().into_iter().map(|(n, _)| n).collect();
    assert_eq!(branches, vec!["refs/heads/feature/nested", "refs/heads/master"]);
    assert_eq!(r.branch_refs(true).unwrap().len(), 3);

    r.update_current_ref("refs/heads/feature/nested").unwrap();
    assert_eq!(
        fs::read_to_string(temp.path().join(".git/HEAD")).unwrap(),
        "ref: refs/heads/feature/nested\n"
    );
    assert_eq!(r.current_ref().unwrap(), "refs/heads/feature/nested");

    r.delete_ref("refs/tags/v1.0").unwrap();
    match r.delete_ref("refs/tags/v1.0") {
        Err(Error::RefNotFound(name)) => assert_eq!(name, "refs/tags/v1.0"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn invalid_names_are_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let r = OnDisk::init(temp.path()).unwrap();
    let id = blob_id("one");

    for name in &["HEAD", "master", "refs/heads/../config", "refs/heads/a b"] {
        match r.update_ref(name, &id) {
            Err(Error::InvalidRefName(_)) => (),
            other => panic!("{}: unexpected {:?}", name, other),
        }
    }

    assert!(!temp.path().join(".git/master").exists());
}

#[test]
fn detached_head() {
    let temp = tempfile::tempdir().unwrap();
    let r = OnDisk::init(temp.path()).unwrap();

    fs::write(
        temp.path().join(".git/HEAD"),
        format!("{}\n", blob_id("one")),
    )
    .unwrap();

    match r.current_ref() {
        Err(Error::InvalidRefName(_)) => (),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn packed_refs() {
    let temp = tempfile::tempdir().unwrap();
    let r = OnDisk::init(temp.path()).unwrap();
    let one = blob_id("one");
    let two = blob_id("two");
    let peeled = blob_id("peeled");

    fs::write(
        temp.path().join(".git/packed-refs"),
        format!(
            "# pack-refs with: peeled fully-peeled sorted \n{} refs/heads/master\n{} refs/tags/v1\n^{}\n{} refs/remotes/origin/main\n",
            one, two, peeled, two
        ),
    )
    .unwrap();

    assert_eq!(r.read_ref("refs/heads/master").unwrap(), Some(one));
    assert_eq!(r.read_ref("refs/tags/v1").unwrap(), Some(two));
    assert_eq!(r.packed_refs().unwrap().len(), 3);

    // A loose ref wins over the packed one.
    r.update_ref("refs/heads/master", &two).unwrap();
    assert_eq!(r.read_ref("refs/heads/master").unwrap(), Some(two));
    assert_eq!(r.branch_refs(false).unwrap()["refs/heads/master"], two);
    assert_eq!(r.branch_refs(true).unwrap().len(), 2);

    r.delete_ref("refs/tags/v1").unwrap();
    assert_eq!(r.read_ref("refs/tags/v1").unwrap(), None);

    let text = fs::read_to_string(temp.path().join(".git/packed-refs")).unwrap();
    assert!(!text.contains("refs/tags/v1"));
    assert!(!text.contains(&format!("^{}", peeled)));
    assert!(text.contains("refs/remotes/origin/main"));

    // Deleting removes both the loose and the packed copy.
    r.delete_ref("refs/heads/master").unwrap();
    assert_eq!(r.read_ref("refs/heads/master").unwrap(), None);
}

#[test]
fn refs_written_by_command_line_git() {
    if !TempGitRepo::git_available() {
        return;
    }

    let mut tgr = TempGitRepo::new();
    tgr.write_file("a.txt", "a\n")
        .git_command(&["add", "a.txt"])
        .git_command(&["commit", "-q", "-m", "first"])
        .git_command(&["branch", "topic"])
        .git_command(&["pack-refs", "--all"]);

    let head = Id::from_hex(tgr.git_output(&["rev-parse", "HEAD"])).unwrap();
    let r = OnDisk::new(tgr.path()).unwrap();

    assert_eq!(r.head_id().unwrap(), Some(head));
    let branches = r.branch_refs(false).unwrap();
    assert_eq!(branches.len(), 2);
    assert_eq!(branches["refs/heads/topic"], head);

    r.delete_ref("refs/heads/topic").unwrap();
    assert_eq!(tgr.git_output(&["branch", "--list", "topic"]), "");

    r.update_ref("refs/heads/other", &head).unwrap();
    assert_eq!(tgr.git_output(&["rev-parse", "other"]), head.to_string());
}
