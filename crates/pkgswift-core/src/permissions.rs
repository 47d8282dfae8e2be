//! Executable bit handling

use std::path::Path;

use tracing::debug;

/// Set mode 755 on `path`.
///
/// Failures are logged, never returned. No-op on non-Unix hosts.
pub async fn make_executable(path: &Path) {
    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;

        match tokio::fs::set_permissions(path, Permissions::from_mode(0o755)).await {
            Ok(()) => debug!("Made {} executable", path.display()),
            Err(e) => tracing::warn!("Failed to make {} executable: {}", path.display(), e),
        }
    }

    #[cfg(not(unix))]
    debug!("Skipping chmod of {} on this platform", path.display());
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[tokio::test]
    async fn test_make_executable_sets_755() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("server");
        std::fs::write(&file, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o600)).unwrap();

        make_executable(&file).await;

        let mode = std::fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[tokio::test]
    async fn test_make_executable_missing_file_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        make_executable(&dir.path().join("missing")).await;
    }
}
