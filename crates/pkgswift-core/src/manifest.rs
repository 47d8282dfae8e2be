//! Package manifest document filter
//!
//! Only `Package.swift` and versioned manifests such as
//! `Package@swift-5.9.swift` are forwarded to the language server.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

pub const MANIFEST_FILE_NAME: &str = "Package.swift";

static VERSIONED_MANIFEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Package@swift-(\d+)(?:\.(\d+))?(?:\.(\d+))?\.swift$")
        .expect("versioned manifest pattern is valid")
});

/// Whether `path` names a Swift package manifest (judged by file name only)
pub fn is_package_manifest(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    name == MANIFEST_FILE_NAME || VERSIONED_MANIFEST.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_manifest() {
        assert!(is_package_manifest(Path::new("Package.swift")));
        assert!(is_package_manifest(Path::new("/work/app/Package.swift")));
    }

    #[test]
    fn test_versioned_manifests() {
        assert!(is_package_manifest(Path::new("Package@swift-5.swift")));
        assert!(is_package_manifest(Path::new("Package@swift-5.9.swift")));
        assert!(is_package_manifest(Path::new("/a/Package@swift-6.0.1.swift")));
    }

    #[test]
    fn test_rejected_names() {
        assert!(!is_package_manifest(Path::new("package.swift")));
        assert!(!is_package_manifest(Path::new("Package.swift.bak")));
        assert!(!is_package_manifest(Path::new("Package@swift-.swift")));
        assert!(!is_package_manifest(Path::new("Package@swift-5.9.1.2.swift")));
        assert!(!is_package_manifest(Path::new("Package@swift-latest.swift")));
        assert!(!is_package_manifest(Path::new("Sources/main.swift")));
        assert!(!is_package_manifest(Path::new("/")));
    }
}
