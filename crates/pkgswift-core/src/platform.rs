//! Host platform detection and release asset naming

use std::env::consts;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    MacOs,
    Linux,
}

/// CPU architecture, normalized to the tokens used in asset names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Arm64,
    X86_64,
}

impl Arch {
    pub fn asset_token(self) -> &'static str {
        match self {
            Arch::Arm64 => "arm64",
            Arch::X86_64 => "x86_64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    /// Detect the host platform, rejecting anything the server is not built for
    pub fn current() -> Result<Self> {
        Self::from_parts(consts::OS, consts::ARCH)
    }

    pub fn from_parts(os: &str, arch: &str) -> Result<Self> {
        let os = match os {
            "macos" => Os::MacOs,
            "linux" => Os::Linux,
            other => {
                return Err(Error::UnsupportedPlatform(format!(
                    "{other} (only macOS and Linux are supported)"
                )))
            }
        };

        let arch = match arch {
            "aarch64" | "arm64" => Arch::Arm64,
            "x86_64" | "x64" => Arch::X86_64,
            other => {
                return Err(Error::UnsupportedPlatform(format!(
                    "{other} (only x86_64 and arm64 architectures are supported)"
                )))
            }
        };

        Ok(Self { os, arch })
    }
}

/// Version number of a release tag, without the leading `v`
pub fn numeric_version(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

/// Name of the release asset built for `arch`:
/// `<component>-<version>-<arch>-<suffix>.zip`
pub fn asset_name(component: &str, tag: &str, arch: Arch, suffix: &str) -> String {
    format!(
        "{component}-{}-{}-{suffix}.zip",
        numeric_version(tag),
        arch.asset_token()
    )
}
