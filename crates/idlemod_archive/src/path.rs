//! Conversions between host paths and archive entry names.
//!
//! Entry names always use `/` as separator, regardless of the host the archive was packed on.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{CorruptArchiveError, Error, Result};

/// Turn `file` into an entry name relative to `root`.
///
/// Fails with [`Error::UnsupportedName`] for names that [`validate_entry_name`] would refuse on
/// unpack, such as `track:1.dat`.
pub fn normalize_rel_path(root: &Path, file: &Path) -> Result<String> {
    let relative = file
        .strip_prefix(root)
        .map_err(|_| {
            Error::file(
                file,
                io::Error::new(io::ErrorKind::InvalidInput, "outside of the packed folder"),
            )
        })?;

    let mut name = String::new();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            continue;
        };
        let part = part
            .to_str()
            .ok_or_else(|| Error::NonUtf8Path(file.to_path_buf()))?;

        if !name.is_empty() {
            name.push('/');
        }
        name.push_str(part);
    }

    validate_entry_name(&name)
        .map_err(|_| Error::UnsupportedName(file.display().to_string()))?;

    Ok(name)
}

/// Validate an entry name read from an archive.
///
/// Names coming from an archive are untrusted: an absolute path (`/etc/shadow`) or a path that
/// breaks out of the target directory (`../runtime`) would let a crafted archive overwrite
/// arbitrary files on extraction.
pub fn validate_entry_name(name: &str) -> Result<&str> {
    let unsafe_path = || CorruptArchiveError::UnsafePath(name.to_owned());

    if name.is_empty() || name.starts_with('/') || name.contains('\\') || name.contains('\0') {
        return Err(unsafe_path().into());
    }

    for part in name.split('/') {
        if part.is_empty() || part == "." || part == ".." || part.contains(':') {
            return Err(unsafe_path().into());
        }
    }

    Ok(name)
}

/// Resolve where an entry is written below `dest`
pub fn entry_destination(dest: &Path, name: &str) -> Result<PathBuf> {
    let name = validate_entry_name(name)?;
    Ok(name.split('/').fold(dest.to_path_buf(), |path, part| path.join(part)))
}
