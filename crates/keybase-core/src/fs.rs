//! Filesystem utilities for the keybase directory.

use std::fs;
use std::io;
use std::path::Path;

/// Create the keybase directory (and parents) if it does not exist.
///
/// Idempotent. On Unix a freshly created directory is restricted to the
/// owner (`0700`); an existing directory keeps its permissions.
///
/// # Errors
///
/// Returns an error if the path exists but is not a directory, or if the
/// directory cannot be created.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} exists and is not a directory", path.display()),
        ));
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path)
}
