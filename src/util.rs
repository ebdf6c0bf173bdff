//! Utility functions and helpers for the deployer
//!
//! Path and file-time helpers that sit underneath the deploy step.

use log::warn;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Last component of a path, splitting on both `/` and `\`
///
/// `Path::file_name` only knows the host separator, so a Windows literal such as
/// `C:\SDL2\bin\SDL2.dll` comes back whole on Unix hosts.
pub fn file_name_of(path: &Path) -> Option<String> {
    let raw = path.to_string_lossy();
    raw.rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_owned)
}

/// Copy `src` to `dst`, keeping permission bits and, best-effort, the modification time
///
/// Returns the number of bytes copied. An existing `dst` is overwritten.
pub fn copy_with_times(src: &Path, dst: &Path) -> io::Result<u64> {
    let bytes = fs::copy(src, dst)?;

    if let Err(e) = copy_modified_time(src, dst) {
        warn!("Could not preserve modification time on {}: {}", dst.display(), e);
    }

    Ok(bytes)
}

// `fs::copy` has already carried the source's permissions over, so a read-only
// destination is made writable for the duration of the timestamp update.
fn copy_modified_time(src: &Path, dst: &Path) -> io::Result<()> {
    let meta = fs::metadata(src)?;
    let modified = meta.modified()?;
    let permissions = meta.permissions();

    if !permissions.readonly() {
        return set_modified(dst, modified);
    }

    let mut writable = permissions.clone();
    writable.set_readonly(false);
    fs::set_permissions(dst, writable)?;

    let result = set_modified(dst, modified);
    fs::set_permissions(dst, permissions)?;
    result
}

fn set_modified(path: &Path, modified: SystemTime) -> io::Result<()> {
    File::options().write(true).open(path)?.set_modified(modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn file_name_from_windows_literal() {
        let path = PathBuf::from(r"C:\SDL2\x86_64-w64-mingw32\bin\SDL2.dll");
        assert_eq!(file_name_of(&path).as_deref(), Some("SDL2.dll"));
    }

    #[test]
    fn file_name_from_unix_path() {
        let path = PathBuf::from("/opt/sdl2/lib/libSDL2.so");
        assert_eq!(file_name_of(&path).as_deref(), Some("libSDL2.so"));
    }

    #[test]
    fn file_name_rejects_directory_like_paths() {
        assert_eq!(file_name_of(Path::new("build/")), None);
        assert_eq!(file_name_of(Path::new("..")), None);
        assert_eq!(file_name_of(Path::new("")), None);
    }

    #[test]
    fn copy_keeps_contents_and_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.bin");
        let dst = dir.path().join("b.bin");
        fs::write(&src, b"\x00\x01runtime").unwrap();

        let old = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000_000);
        File::options().write(true).open(&src).unwrap().set_modified(old).unwrap();

        let bytes = copy_with_times(&src, &dst).unwrap();

        assert_eq!(bytes, 9);
        assert_eq!(fs::read(&dst).unwrap(), b"\x00\x01runtime");
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), old);
    }

    #[test]
    fn copy_keeps_mtime_of_read_only_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("SDL2.dll");
        let dst = dir.path().join("deployed.dll");
        fs::write(&src, b"MZ").unwrap();

        let old = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000_000);
        File::options().write(true).open(&src).unwrap().set_modified(old).unwrap();
        let mut permissions = fs::metadata(&src).unwrap().permissions();
        permissions.set_readonly(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            permissions.set_mode(0o444);
        }
        fs::set_permissions(&src, permissions).unwrap();

        copy_with_times(&src, &dst).unwrap();

        let meta = fs::metadata(&dst).unwrap();
        assert_eq!(meta.modified().unwrap(), old);
        assert!(meta.permissions().readonly());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            assert_eq!(meta.permissions().mode() & 0o777, 0o444);
        }
    }

    #[cfg(unix)]
    #[test]
    fn copy_keeps_permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.so");
        let dst = dir.path().join("b.so");
        fs::write(&src, b"elf").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o750)).unwrap();

        copy_with_times(&src, &dst).unwrap();

        let mode = fs::metadata(&dst).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o750);
    }
}
