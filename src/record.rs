//! The local time record: `{"published_at": "YYYY-MM-DDTHH:MM:SSZ"}`.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TimeRecord {
    pub published_at: String,
}

impl TimeRecord {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            published_at: time.format(RECORD_TIME_FORMAT).to_string(),
        }
    }

    pub fn time(&self) -> Result<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.published_at, RECORD_TIME_FORMAT)
            .map(|t| t.and_utc())
            .map_err(|e| Error::InvalidRecord(format!("{:?}: {e}", self.published_at)))
    }

    /// Reads the record at `path`. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&data)?))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}
