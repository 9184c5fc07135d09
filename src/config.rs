use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Optional config file read from the working directory by the binary.
pub const CONFIG_FILE: &str = "gram-updater.toml";

/// Where to look for the release and where to keep the local copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    pub owner: String,
    pub repo: String,
    pub tag: String,
    /// File name of the asset inside the release.
    pub asset_name: String,
    /// Direct download URL. When unset, the asset's `browser_download_url` is used.
    pub download_url: Option<String>,
    pub target_file: PathBuf,
    pub time_record_file: PathBuf,
    /// `record_file` or `file_mtime`.
    pub mode: String,
    pub api_base: String,
    /// Overall request timeout; none by default since the asset can be large.
    pub timeout_secs: Option<u64>,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            owner: "amzxyz".to_string(),
            repo: "RIME-LMDG".to_string(),
            tag: "LTS".to_string(),
            asset_name: "wanxiang-lts-zh-hans.gram".to_string(),
            download_url: None,
            target_file: PathBuf::from("wanxiang-lts-zh-hans.gram"),
            time_record_file: PathBuf::from("release_time_record.json"),
            mode: "record_file".to_string(),
            api_base: "https://api.github.com".to_string(),
            timeout_secs: None,
        }
    }
}

impl UpdaterConfig {
    pub fn release_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/tags/{}",
            self.api_base.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.tag
        )
    }

    /// `<target>.tmp`, next to the target so the final rename stays on one filesystem.
    pub fn temp_file(&self) -> PathBuf {
        let mut name = self.target_file.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(toml::from_str(&data)?)
    }

    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let cfg = Self::load(path)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(cfg)
    }
}
