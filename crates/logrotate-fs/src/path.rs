//! File name validation and log path construction

use logrotate_core::{constants, Error, Result};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// Check that `name` is non-empty and free of illegal characters.
///
/// Names made only of dots (`.`, `..`) are rejected as well so they can
/// never walk out of the log directory.
pub fn is_valid_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().all(|c| c == '.')
        && !name
            .chars()
            .any(|c| c.is_whitespace() || constants::ILLEGAL_FILE_NAME_CHARS.contains(&c))
}

/// Strip whitespace, path separators and dots from `name`.
///
/// Returns an empty string if what remains is still not a valid name.
pub fn sanitize_file_name(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '/' | '\\' | '.'))
        .collect();

    if is_valid_file_name(&stripped) {
        stripped
    } else {
        String::new()
    }
}

/// Append the `.log` extension unless `name` already carries it
pub fn append_log_extension(name: &str) -> String {
    let suffix = format!(".{}", constants::LOG_EXTENSION);
    if name.ends_with(&suffix) {
        name.to_string()
    } else {
        constants::log_file_name(name)
    }
}

/// Strip a trailing `.log` extension
pub fn strip_log_extension(name: &str) -> &str {
    let suffix = format!(".{}", constants::LOG_EXTENSION);
    match name.strip_suffix(suffix.as_str()) {
        Some(stem) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Join `directory` and `file_name` into a weakly canonical path.
///
/// Backslash separators in `directory` are unified to `/`. The directory
/// does not have to exist: its deepest existing ancestor is canonicalized
/// and the rest is appended lexically.
pub fn build_path(directory: impl AsRef<Path>, file_name: &str) -> Result<PathBuf> {
    if !is_valid_file_name(file_name) {
        return Err(Error::invalid_name(file_name));
    }

    let directory = normalize_separators(directory.as_ref());
    let resolved = weakly_canonical(&directory)?;
    Ok(resolved.join(file_name))
}

fn normalize_separators(directory: &Path) -> PathBuf {
    let raw = directory.to_string_lossy();
    if raw.contains('\\') {
        PathBuf::from(raw.replace('\\', "/"))
    } else {
        directory.to_path_buf()
    }
}

/// Canonicalize the existing prefix of `path`, then resolve the rest lexically
fn weakly_canonical(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| Error::path_resolution(path, e))?
            .join(path)
    };

    let mut existing = absolute.clone();
    // Components that do not exist yet, deepest first
    let mut missing: Vec<OsString> = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(mut resolved) => {
                for part in missing.iter().rev() {
                    if part == ".." {
                        resolved.pop();
                    } else if part != "." {
                        resolved.push(part);
                    }
                }
                return Ok(resolved);
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let Some(last) = existing.components().next_back() else {
                    return Err(Error::path_resolution(&absolute, err));
                };
                missing.push(last.as_os_str().to_os_string());
                if !existing.pop() {
                    return Err(Error::path_resolution(&absolute, err));
                }
            }
            Err(err) => return Err(Error::path_resolution(&absolute, err)),
        }
    }
}
