use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use fetching::{build_client, download_to_file, fetch_release};

use crate::{
    app_state::AppStateManager, checksum::sha256_file, config::UpdaterConfig,
    record::TimeRecord, Error, Result,
};

pub mod fetching;

/// How the local reference time is obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckMode {
    /// Time stored in the JSON time record.
    RecordFile,
    /// Modification time of the target file.
    FileMtime,
}

impl FromStr for CheckMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "record_file" => Ok(CheckMode::RecordFile),
            "file_mtime" => Ok(CheckMode::FileMtime),
            other => Err(Error::UnsupportedMode(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The local copy is at least as new as the release; nothing was downloaded.
    UpToDate,
    /// The download differed from the local copy and replaced it.
    Updated,
    /// The download was identical to the local copy and was discarded.
    Unchanged,
}

/// Local time to compare the release against, if there is a usable one.
fn local_reference_time(
    mode: CheckMode,
    target: &Path,
    record_path: &Path,
) -> Result<Option<DateTime<Utc>>> {
    if !target.exists() {
        return Ok(None);
    }

    match mode {
        CheckMode::RecordFile => match TimeRecord::load(record_path) {
            Ok(Some(record)) => match record.time() {
                Ok(time) => Ok(Some(time)),
                Err(err) => {
                    tracing::warn!("ignoring time record {}: {err}", record_path.display());
                    Ok(None)
                }
            },
            Ok(None) => Ok(None),
            Err(err) => {
                tracing::warn!("ignoring time record {}: {err}", record_path.display());
                Ok(None)
            }
        },
        CheckMode::FileMtime => {
            let modified = fs::metadata(target)?.modified()?;
            Ok(Some(DateTime::<Utc>::from(modified)))
        }
    }
}

/// Whether the release at `release_time` should be downloaded.
pub fn needs_update(
    release_time: DateTime<Utc>,
    mode: CheckMode,
    target: &Path,
    record_path: &Path,
) -> Result<bool> {
    match local_reference_time(mode, target, record_path)? {
        Some(local_time) if release_time <= local_time => {
            tracing::info!(
                "{} is up to date (local time {local_time}, release time {release_time})",
                target.display()
            );
            Ok(false)
        }
        Some(local_time) => {
            tracing::info!("release time {release_time} is newer than local time {local_time}");
            Ok(true)
        }
        None => {
            tracing::info!(
                "no local reference for {}, updating",
                target.display()
            );
            Ok(true)
        }
    }
}

/// Replaces `target` with `temp` when their contents differ, otherwise discards `temp`.
///
/// The time record is written in both cases.
pub fn promote_if_changed(
    temp: &Path,
    target: &Path,
    record_path: &Path,
    release_time: DateTime<Utc>,
) -> Result<UpdateOutcome> {
    let temp_sha256 = sha256_file(temp)?;
    let target_sha256 = sha256_file(target)?;
    tracing::info!(
        downloaded = temp_sha256.as_deref().unwrap_or("-"),
        target = target_sha256.as_deref().unwrap_or("-"),
        "sha256"
    );

    let outcome = if temp_sha256 != target_sha256 {
        fs::rename(temp, target)?;
        tracing::info!("{} updated", target.display());
        UpdateOutcome::Updated
    } else {
        fs::remove_file(temp)?;
        tracing::info!("{} content unchanged, discarded download", target.display());
        UpdateOutcome::Unchanged
    };

    // Written in both check modes, so a later record_file run starts from this release.
    tracing::info!("recording release time in {}", record_path.display());
    TimeRecord::new(release_time).save(record_path)?;

    Ok(outcome)
}

/// Downloads the asset into the temp file and promotes it if it changed.
pub fn update_file_if_needed(
    config: &UpdaterConfig,
    client: &reqwest::blocking::Client,
    download_url: &str,
    release_time: DateTime<Utc>,
    app_state: &AppStateManager,
) -> Result<UpdateOutcome> {
    let mode = CheckMode::from_str(&config.mode)?;

    if !needs_update(release_time, mode, &config.target_file, &config.time_record_file)? {
        return Ok(UpdateOutcome::UpToDate);
    }

    let temp = config.temp_file();
    let downloaded = download_to_file(
        client,
        download_url,
        &temp,
        |total| app_state.start_download(&format!("Downloading {download_url}..."), total),
        |downloaded, progress| app_state.update_download(downloaded, progress),
    );
    app_state.finish_download();

    if let Err(err) = downloaded {
        if let Err(rm_err) = fs::remove_file(&temp) {
            if rm_err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("failed to remove {}: {rm_err}", temp.display());
            }
        }
        return Err(err);
    }

    promote_if_changed(&temp, &config.target_file, &config.time_record_file, release_time)
}

/// Runs one full check: query, decide, download, promote.
pub fn check_and_update(config: &UpdaterConfig, app_state: &AppStateManager) -> Result<UpdateOutcome> {
    // Reject a bad mode before touching the network.
    CheckMode::from_str(&config.mode)?;

    let client = build_client(config)?;

    app_state.start_operation(&format!(
        "Fetching release {} of {}/{}...",
        config.tag, config.owner, config.repo
    ));
    let release = fetch_release(&client, config)?;
    let asset = release.find_asset(&config.asset_name)?;

    let download_url = config
        .download_url
        .as_deref()
        .or(asset.browser_download_url.as_deref())
        .ok_or_else(|| Error::AssetNotFound(format!("{} (no download URL)", asset.name)))?;

    update_file_if_needed(config, &client, download_url, asset.updated_at, app_state)
}

/// Entry point for one run. Failures are reported and leave the local files untouched.
pub fn run(config: &UpdaterConfig, app_state: &AppStateManager) -> Option<UpdateOutcome> {
    match check_and_update(config, app_state) {
        Ok(outcome) => {
            app_state.finish_operation(outcome);
            Some(outcome)
        }
        Err(err) => {
            tracing::error!("update check failed: {err}");
            app_state.set_operation_failed(&format!("Update failed: {err}"));
            None
        }
    }
}
