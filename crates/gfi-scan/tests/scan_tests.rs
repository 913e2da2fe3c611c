use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use gfi_scan::{
    EntryKind, ErrorPolicy, InventoryBuilder, KindFilter, PathFilter, ScanError, Walk, WalkConfig,
    summarize_dirs,
};
use tempfile::TempDir;

const NONE: [&str; 0] = [];

/// root/{file0, dir0/file0, dir1/file1, dir2/file2, file1, file2}
fn create_test_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for i in 0..3 {
        fs::write(root.join(format!("file{i}")), "").unwrap();
        let dir = root.join(format!("dir{i}"));
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join(format!("file{i}")), "x".repeat(i + 1)).unwrap();
    }
    temp
}

fn keys_under(root: &Path) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    let mut stack = vec![root.to_path_buf()];
    keys.insert(root.to_string_lossy().into_owned());
    while let Some(dir) = stack.pop() {
        for dirent in fs::read_dir(&dir).unwrap() {
            let path = dirent.unwrap().path();
            if path.is_dir() {
                stack.push(path.clone());
            }
            keys.insert(path.to_string_lossy().into_owned());
        }
    }
    keys
}

#[test]
fn test_walk_is_complete() {
    let temp = create_test_tree();
    let root = temp.path().canonicalize().unwrap();

    let walked: BTreeSet<String> = Walk::start(&WalkConfig::new(&root))
        .unwrap()
        .map(|item| item.unwrap().key)
        .collect();

    assert_eq!(walked, keys_under(&root));
}

#[test]
fn test_single_thread_walk_completes() {
    let temp = create_test_tree();
    let config = WalkConfig::builder()
        .roots(vec![temp.path().to_path_buf()])
        .threads(1usize)
        .build()
        .unwrap();

    let report = InventoryBuilder::new().build(&config).unwrap();
    assert_eq!(report.inventory.count, 10);
}

#[test]
fn test_sorted_names_match_layout() {
    let temp = create_test_tree();
    let root = temp.path().canonicalize().unwrap();
    let config = WalkConfig::builder()
        .roots(vec![root.clone()])
        .sort(true)
        .build()
        .unwrap();

    let report = InventoryBuilder::new().build(&config).unwrap();
    let names: Vec<&str> = report.inventory.iter().map(|e| e.name.as_str()).collect();
    let root_name = root.file_name().unwrap().to_str().unwrap();

    assert_eq!(
        names,
        vec![
            root_name, "dir0", "file0", "dir1", "file1", "dir2", "file2", "file0", "file1", "file2"
        ]
    );
}

#[test]
fn test_kind_filter_files_only() {
    let temp = create_test_tree();
    let config = WalkConfig::builder()
        .roots(vec![temp.path().to_path_buf()])
        .filter(PathFilter::default().with_kind(KindFilter::FilesOnly))
        .build()
        .unwrap();

    let report = InventoryBuilder::new().build(&config).unwrap();
    assert_eq!(report.inventory.count, 6);
    assert!(report.inventory.iter().all(|e| e.kind == EntryKind::File));
}

#[test]
fn test_kind_filter_dirs_only() {
    let temp = create_test_tree();
    let config = WalkConfig::builder()
        .roots(vec![temp.path().to_path_buf()])
        .filter(PathFilter::default().with_kind(KindFilter::DirsOnly))
        .build()
        .unwrap();

    let report = InventoryBuilder::new().build(&config).unwrap();
    // root + dir0..dir2
    assert_eq!(report.inventory.count, 4);
    assert!(report.inventory.iter().all(|e| e.is_dir()));
}

#[test]
fn test_exclude_takes_precedence() {
    let temp = create_test_tree();
    let filter = PathFilter::new(["file"], ["dir1"]).unwrap();
    let config = WalkConfig::builder()
        .roots(vec![temp.path().to_path_buf()])
        .filter(filter)
        .build()
        .unwrap();

    let report = InventoryBuilder::new().build(&config).unwrap();
    let keys: Vec<&str> = report.inventory.iter().map(|e| e.key.as_str()).collect();

    assert_eq!(keys.len(), 5);
    assert!(keys.iter().all(|k| !k.contains("dir1")));
}

#[test]
fn test_exclude_does_not_prune_descent() {
    let temp = create_test_tree();
    let filter = PathFilter::new(NONE, ["dir0$"]).unwrap();
    let config = WalkConfig::builder()
        .roots(vec![temp.path().to_path_buf()])
        .filter(filter)
        .build()
        .unwrap();

    let report = InventoryBuilder::new().build(&config).unwrap();
    assert!(report.inventory.iter().all(|e| !e.key.ends_with("dir0")));
    assert!(report
        .inventory
        .iter()
        .any(|e| e.key.ends_with(&format!("dir0{}file0", std::path::MAIN_SEPARATOR))));
}

#[test]
fn test_multiple_roots() {
    let first = create_test_tree();
    let second = create_test_tree();
    let config = WalkConfig::builder()
        .roots(vec![first.path().to_path_buf(), second.path().to_path_buf()])
        .build()
        .unwrap();

    let report = InventoryBuilder::new().build(&config).unwrap();
    assert_eq!(report.inventory.count, 20);
}

#[test]
fn test_root_must_be_directory() {
    let temp = create_test_tree();
    let config = WalkConfig::new(temp.path().join("file0"));

    let err = InventoryBuilder::new().build(&config).unwrap_err();
    assert!(matches!(err, ScanError::NotADirectory { .. }));
}

fn walked_keys(root: &Path) -> BTreeSet<String> {
    Walk::start(&WalkConfig::new(root))
        .unwrap()
        .map(|item| item.unwrap().key)
        .collect()
}

#[test]
fn test_root_aliases_share_keys() {
    let temp = TempDir::new().unwrap();
    let base = temp.path().canonicalize().unwrap();
    fs::create_dir_all(base.join("data/sub")).unwrap();
    fs::create_dir(base.join("other")).unwrap();
    fs::write(base.join("data/a.txt"), "a").unwrap();
    fs::write(base.join("data/sub/b.txt"), "b").unwrap();

    let plain = walked_keys(&base.join("data"));
    assert_eq!(plain.len(), 4);
    assert!(plain.contains(&base.join("data/sub/b.txt").to_string_lossy().into_owned()));

    assert_eq!(walked_keys(&base.join("data/")), plain);
    assert_eq!(walked_keys(&base.join("other/../data")), plain);
    assert_eq!(walked_keys(&base.join("./data/.")), plain);
}

#[test]
fn test_dropping_walk_early_does_not_hang() {
    let temp = create_test_tree();
    let mut walk = Walk::start(&WalkConfig::new(temp.path())).unwrap();
    assert!(walk.next().is_some());
    drop(walk);
}

#[test]
fn test_dir_summaries_from_walk() {
    let temp = create_test_tree();
    let root = temp.path().canonicalize().unwrap();
    let report = InventoryBuilder::new().build(&WalkConfig::new(&root)).unwrap();

    let summaries = summarize_dirs(&report.inventory);
    let top = summaries
        .iter()
        .find(|s| Path::new(&s.entry.key) == root)
        .unwrap();

    assert_eq!(top.file_count, 6);
    assert_eq!(top.dir_count, 3);
    assert_eq!(top.total_size, 6);
}

#[cfg(unix)]
mod unreadable {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Lock `dir`; returns false when the current user can still list it (root).
    fn lock(dir: &Path) -> bool {
        fs::set_permissions(dir, fs::Permissions::from_mode(0o000)).unwrap();
        fs::read_dir(dir).is_err()
    }

    fn unlock(dir: &Path) {
        fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_unreadable_dir_fails_fast() {
        let temp = create_test_tree();
        let locked = temp.path().join("dir1");
        if !lock(&locked) {
            unlock(&locked);
            return;
        }

        let result = InventoryBuilder::new().build(&WalkConfig::new(temp.path()));
        unlock(&locked);

        assert!(matches!(result, Err(ScanError::PermissionDenied { .. })));
    }

    #[test]
    fn test_unreadable_dir_skipped() {
        let temp = create_test_tree();
        let locked = temp.path().join("dir1");
        if !lock(&locked) {
            unlock(&locked);
            return;
        }

        let mut config = WalkConfig::new(temp.path());
        config.error_policy = ErrorPolicy::Skip;
        let result = InventoryBuilder::new().build(&config);
        unlock(&locked);

        let report = result.unwrap();
        // dir1 itself is listed by its parent; only its child is lost.
        assert_eq!(report.inventory.count, 9);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].path.ends_with("dir1"));
    }

    #[test]
    fn test_symlink_cycle_reported() {
        let temp = create_test_tree();
        std::os::unix::fs::symlink(temp.path(), temp.path().join("dir0/loop")).unwrap();

        let mut config = WalkConfig::new(temp.path());
        config.follow_symlinks = true;
        config.error_policy = ErrorPolicy::Skip;

        let report = InventoryBuilder::new().build(&config).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, gfi_scan::WarningKind::Cycle);
    }

    #[test]
    fn test_symlink_alias_is_walked() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        fs::create_dir(root.join("shared")).unwrap();
        fs::write(root.join("shared/f.txt"), "f").unwrap();
        std::os::unix::fs::symlink(root.join("shared"), root.join("link")).unwrap();

        let mut config = WalkConfig::new(&root);
        config.follow_symlinks = true;

        let report = InventoryBuilder::new().build(&config).unwrap();
        assert!(!report.has_warnings());

        let keys: BTreeSet<String> = report.inventory.iter().map(|e| e.key.clone()).collect();
        let expected: BTreeSet<String> = ["", "shared", "shared/f.txt", "link", "link/f.txt"]
            .iter()
            .map(|p| {
                let path = if p.is_empty() { root.clone() } else { root.join(p) };
                path.to_string_lossy().into_owned()
            })
            .collect();
        assert_eq!(keys, expected);
    }
}
