//! Standard locations for pkgswift files

use std::path::PathBuf;

const APP_DIR: &str = "pkgswift";
const CONFIG_FILE: &str = "config.toml";

/// `<config dir>/pkgswift/config.toml`
pub fn config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Per-install persistent storage root (`<data dir>/pkgswift`)
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR))
}
