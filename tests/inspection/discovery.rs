use std::collections::BTreeSet;
use std::fs;

use siginspect::discovery::{discover, DiscoveryOptions, BINARY_EXTENSIONS};
use siginspect::error::FailureKind;

use crate::common::test_utils::{create_tree, relative_paths, relative_set};

const TREE: &[&str] = &[
    "a.exe",
    "b.txt",
    "c.dll",
    "setup.msi",
    "UPPER.EXE",
    "sub/d.exe",
    "sub/e.log",
    "sub/deeper/f.dll",
    "other/g.msi",
];

#[test]
fn test_non_recursive_stays_in_root() {
    let dir = create_tree(TREE);

    for binaries_only in [false, true] {
        for path in discover(dir.path(), false, binaries_only) {
            let path = path.unwrap();
            assert_eq!(path.parent(), Some(dir.path()), "{}", path.display());
        }
    }
}

#[test]
fn test_unfiltered_walk_matches_listing() {
    let dir = create_tree(TREE);

    let listed: BTreeSet<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().unwrap().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();

    assert_eq!(relative_set(dir.path(), discover(dir.path(), false, false)), listed);
}

#[test]
fn test_binaries_only_filters_every_level() {
    let dir = create_tree(TREE);

    let found = relative_set(dir.path(), discover(dir.path(), true, true));
    for path in &found {
        let ext = path.rsplit('.').next().unwrap();
        assert!(BINARY_EXTENSIONS.contains(&ext), "{path}");
    }
    let expected: BTreeSet<String> = [
        "a.exe",
        "c.dll",
        "setup.msi",
        "sub/d.exe",
        "sub/deeper/f.dll",
        "other/g.msi",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(found, expected);
}

#[test]
fn test_recursive_order_is_files_first_depth_first() {
    let dir = create_tree(TREE);

    let found = relative_paths(dir.path(), discover(dir.path(), true, false));
    assert_eq!(found.len(), TREE.len());

    let top_level = found.iter().take_while(|p| !p.contains('/')).count();
    assert_eq!(top_level, 5, "{found:?}");

    // A subtree is walked contiguously before the next sibling starts.
    let sub: Vec<_> = found
        .iter()
        .enumerate()
        .filter(|(_, p)| p.starts_with("sub/"))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(sub.last().unwrap() - sub.first().unwrap() + 1, sub.len());

    let position = |name: &str| found.iter().position(|p| p == name).unwrap();
    assert!(position("sub/d.exe") < position("sub/deeper/f.dll"));
    assert!(position("sub/e.log") < position("sub/deeper/f.dll"));
}

#[test]
fn test_walk_is_repeatable() {
    let dir = create_tree(TREE);
    let options = DiscoveryOptions {
        recursive: true,
        binaries_only: false,
    };

    let first = relative_set(dir.path(), options.walk(dir.path()));
    let second = relative_set(dir.path(), options.walk(dir.path()));
    assert_eq!(first, second);
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_isolated() {
    use std::os::unix::fs::PermissionsExt;

    let dir = create_tree(TREE);
    let locked = dir.path().join("sub");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    // Privileged users can list it anyway.
    let enforced = fs::read_dir(&locked).is_err();

    let mut found = BTreeSet::new();
    let mut failures = Vec::new();
    for item in discover(dir.path(), true, false) {
        match item {
            Ok(path) => {
                found.insert(path.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned());
            }
            Err(err) => failures.push(err),
        }
    }
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    for name in ["a.exe", "b.txt", "c.dll", "setup.msi", "UPPER.EXE", "other/g.msi"] {
        assert!(found.contains(name), "{name} missing from {found:?}");
    }
    if enforced {
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path(), locked);
        assert_eq!(FailureKind::classify(&failures[0]), FailureKind::AccessDenied);
        assert!(!found.iter().any(|p| p.starts_with("sub/")));
    } else {
        assert!(failures.is_empty());
    }
}

#[test]
fn test_directory_vanishing_mid_walk_is_isolated() {
    let dir = create_tree(&["a.exe", "gone/x.exe", "swapped/y.exe", "kept/z.exe"]);
    let gone = dir.path().join("gone");
    let swapped = dir.path().join("swapped");

    let mut walk = discover(dir.path(), true, false);
    // The root is listed before its first file is handed out, so all three
    // subdirectories are queued but unread.
    let first = walk.next().unwrap().unwrap();
    assert_eq!(first, dir.path().join("a.exe"));

    fs::remove_dir_all(&gone).unwrap();
    fs::remove_dir_all(&swapped).unwrap();
    fs::write(&swapped, b"MZ").unwrap();

    let mut found = BTreeSet::new();
    let mut failures = Vec::new();
    for item in walk {
        match item {
            Ok(path) => {
                found.insert(path.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned());
            }
            Err(err) => failures.push(err),
        }
    }

    assert_eq!(found, BTreeSet::from(["kept/z.exe".to_string()]));
    let mut failed: Vec<_> = failures.iter().map(|e| e.path().to_path_buf()).collect();
    failed.sort();
    assert_eq!(failed, vec![gone, swapped]);
    for failure in &failures {
        assert_eq!(FailureKind::classify(failure), FailureKind::IoFailure);
    }
}
