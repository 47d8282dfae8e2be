//! Archive extraction for downloaded release assets

use std::ffi::OsStr;
use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::process;

/// Expands an archive into a directory, overwriting existing files
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;
}

/// Extracts zip archives with the system `unzip` utility (macOS and Linux only)
#[derive(Debug, Default, Clone, Copy)]
pub struct UnzipExtractor;

#[async_trait]
impl Extractor for UnzipExtractor {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        if !cfg!(any(target_os = "macos", target_os = "linux")) {
            return Err(Error::UnsupportedPlatform(format!(
                "archive extraction is not available on {}",
                std::env::consts::OS
            )));
        }

        debug!("Extracting {} into {}", archive.display(), dest.display());
        process::run(
            "unzip",
            [
                OsStr::new("-o"),
                archive.as_os_str(),
                OsStr::new("-d"),
                dest.as_os_str(),
            ],
        )
        .await
        .map_err(Error::Extraction)?;

        Ok(())
    }
}

#[cfg(all(test, any(target_os = "macos", target_os = "linux")))]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, data) in entries {
            zip.start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    fn unzip_available() -> bool {
        which::which("unzip").is_ok()
    }

    #[tokio::test]
    async fn test_unzip_extracts_and_overwrites() {
        if !unzip_available() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("server.zip");
        write_zip(&archive, &[("package-swift-lsp", b"new build")]);
        std::fs::write(dir.path().join("package-swift-lsp"), b"old build").unwrap();

        UnzipExtractor.extract(&archive, dir.path()).await.unwrap();

        let content = std::fs::read(dir.path().join("package-swift-lsp")).unwrap();
        assert_eq!(content, b"new build");
    }

    #[tokio::test]
    async fn test_unzip_missing_archive() {
        if !unzip_available() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let result = UnzipExtractor
            .extract(&dir.path().join("missing.zip"), dir.path())
            .await;
        assert!(matches!(result, Err(Error::Extraction(_))));
    }
}
