//! Network share path rewriting.

use std::path::{Component, Path, PathBuf};

/// Rewrite an administrative share path (`\\host\c$\dir`) to its local form
/// (`c:\dir`).
///
/// Paths that are not administrative shares are returned unchanged, so the
/// same object reached through any share alias yields one logical key.
pub fn share_to_local(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    let Some(rest) = text
        .strip_prefix(r"\\")
        .or_else(|| text.strip_prefix("//"))
    else {
        return path.to_path_buf();
    };

    let mut parts = rest.split(['\\', '/']);
    let _host = parts.next();
    let Some(share) = parts.next() else {
        return path.to_path_buf();
    };

    let mut chars = share.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(drive), Some('$'), None) if drive.is_ascii_alphabetic() => {
            let tail: Vec<&str> = parts.filter(|p| !p.is_empty()).collect();
            PathBuf::from(format!(r"{drive}:\{}", tail.join(r"\")))
        }
        _ => path.to_path_buf(),
    }
}

/// Build the administrative share form of a local drive path on `host`.
pub fn remote_path(host: &str, path: &Path) -> PathBuf {
    let local = path.to_string_lossy().replace(':', "$");
    let local = local.trim_start_matches(['\\', '/']);
    PathBuf::from(format!(r"\\{host}\{local}"))
}

/// Resolve `path` against the working directory and clean it lexically.
///
/// `.` components and trailing separators are dropped and `..` removes the
/// preceding component, so `data`, `data/` and `other/../data` give one
/// result. Symlinks are not resolved.
pub fn absolute_clean(path: &Path) -> std::io::Result<PathBuf> {
    Ok(clean(&std::path::absolute(path)?))
}

/// Clean a path lexically without touching the file system.
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            _ => out.push(component),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}
