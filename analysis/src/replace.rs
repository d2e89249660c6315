//! Atomic replacement of a file's contents.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::debug;
use tempfile::{Builder, NamedTempFile};

use crate::error::RewriteError;

/// Replace `target` with `text`.
///
/// The text goes to a temporary file in the target's directory, which is
/// then renamed over the target. Until the rename the original is never
/// touched; if anything fails the temporary is removed.
pub fn commit(text: &str, target: &Path) -> Result<(), RewriteError> {
    commit_with(text, target, |tmp, text| {
        tmp.write_all(text.as_bytes())?;
        tmp.flush()?;
        tmp.as_file().sync_all()
    })
}

/// [`commit`] with the temporary file filled in by `write`.
fn commit_with<W>(text: &str, target: &Path, write: W) -> Result<(), RewriteError>
where
    W: FnOnce(&mut NamedTempFile, &str) -> std::io::Result<()>,
{
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = Builder::new()
        .prefix(".logdel-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| RewriteError::io(dir, e))?;

    write(&mut tmp, text).map_err(|e| RewriteError::io(tmp.path(), e))?;

    if let Ok(meta) = fs::metadata(target) {
        fs::set_permissions(tmp.path(), meta.permissions())
            .map_err(|e| RewriteError::io(tmp.path(), e))?;
    }

    tmp.persist(target).map_err(|e| RewriteError::Persist {
        path: target.to_path_buf(),
        source: e.error,
    })?;

    debug!("replaced {}", target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with(".logdel-"))
            .collect()
    }

    #[test]
    fn replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("main.go");
        fs::write(&target, "package main\n\nimport \"log\"\n").unwrap();

        commit("package main\n", &target).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "package main\n");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn creates_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("new.go");
        commit("package p\n", &target).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "package p\n");
    }

    #[cfg(unix)]
    #[test]
    fn keeps_original_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("main.go");
        fs::write(&target, "package main\n").unwrap();
        fs::set_permissions(&target, fs::Permissions::from_mode(0o640)).unwrap();

        commit("package main\n\n", &target).unwrap();

        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn failed_write_keeps_original_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("main.go");
        let original = "package main\n\nimport \"log\"\n\nfunc main() {\n\tlog.Println(1)\n}\n";
        fs::write(&target, original).unwrap();

        let err = commit_with("package main\n", &target, |tmp, text| {
            tmp.write_all(&text.as_bytes()[..4])?;
            Err(std::io::Error::other("disk full"))
        })
        .unwrap_err();

        assert!(matches!(err, RewriteError::Io { .. }));
        assert_eq!(fs::read(&target).unwrap(), original.as_bytes());
        assert!(leftovers(dir.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn unwritable_directory_keeps_original() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("main.go");
        fs::write(&target, "package main\n").unwrap();
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o555)).unwrap();

        // root ignores directory permissions
        if fs::write(dir.path().join("writable"), "").is_ok() {
            fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = commit("package other\n", &target);
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(result, Err(RewriteError::Io { .. })));
        assert_eq!(fs::read_to_string(&target).unwrap(), "package main\n");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("absent").join("main.go");
        let err = commit("package main\n", &target).unwrap_err();
        assert!(matches!(err, RewriteError::Io { .. }));
        assert!(!target.exists());
    }

    #[cfg(unix)]
    #[test]
    fn failed_rename_leaves_no_temporary() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("pkg");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.go"), "package pkg\n").unwrap();

        let err = commit("package main\n", &target).unwrap_err();
        assert!(matches!(err, RewriteError::Persist { .. }));
        assert!(target.is_dir());
        assert!(leftovers(dir.path()).is_empty());
    }
}
