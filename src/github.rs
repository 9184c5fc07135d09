use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{Error, Result};

#[derive(Deserialize, Clone, Debug)]
pub struct Asset {
    pub name: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub browser_download_url: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    /// Looks up an asset by exact file name.
    pub fn find_asset(&self, name: &str) -> Result<&Asset> {
        self.assets
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| Error::AssetNotFound(name.to_string()))
    }
}
