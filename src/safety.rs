//! Safety checks before deleting catalog files.
//!
//! The store removes leftover staging files from interrupted builds. These
//! checks make sure the path about to be removed really is a staging file and
//! not the live catalog or one of its snapshots.

use std::path::Path;

use crate::error::{Error, Result};

/// Validates that a staging path is safe to delete.
///
/// Checks:
/// - The file name must end with the required suffix (e.g., ".building")
/// - The path cannot be the same as any protected path (live catalog)
/// - The path must not be a directory
pub fn validate_staging_path(
    staging: &Path,
    required_suffix: &str,
    protected_paths: &[&Path],
) -> Result<()> {
    let name = staging.file_name().and_then(|n| n.to_str()).unwrap_or("");

    if !name.ends_with(required_suffix) {
        return Err(Error::UnsafePath(format!(
            "staging file '{}' must end with '{}'",
            staging.display(),
            required_suffix
        )));
    }

    for protected in protected_paths {
        if staging == *protected {
            return Err(Error::UnsafePath(format!(
                "staging file '{}' cannot be the same as catalog '{}'",
                staging.display(),
                protected.display()
            )));
        }
    }

    if staging.is_dir() {
        return Err(Error::UnsafePath(format!(
            "staging path '{}' is a directory",
            staging.display()
        )));
    }

    Ok(())
}
