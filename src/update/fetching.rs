use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

use const_format::concatcp;
use reqwest::blocking::Client;
use reqwest::IntoUrl;

use crate::app_state::Progress;
use crate::config::UpdaterConfig;
use crate::github::Release;
use crate::{Error, Result};

const USER_AGENT: &str = concatcp!("GramUpdater/", env!("CARGO_PKG_VERSION"));

const BLOCK_SIZE: usize = 8192;

pub fn build_client(config: &UpdaterConfig) -> Result<Client> {
    Ok(reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.timeout_secs.map(Duration::from_secs))
        .build()?)
}

pub fn fetch_release(client: &Client, config: &UpdaterConfig) -> Result<Release> {
    let response = client
        .get(config.release_url())
        .header("Accept", "application/vnd.github+json")
        .send()?;

    if !response.status().is_success() {
        return Err(Error::ApiStatus(response.status()));
    }

    Ok(response.json()?)
}

/// Streams `url` into `path`, returning the number of bytes written.
///
/// `on_start` receives the declared content length, `progress_cb` the running
/// byte count after every block.
pub fn download_to_file<U: IntoUrl>(
    client: &Client,
    url: U,
    path: &Path,
    on_start: impl FnOnce(Option<u64>),
    progress_cb: impl Fn(u64, Progress),
) -> Result<u64> {
    let mut response = client
        .get(url)
        .header("Accept", "application/octet-stream")
        .send()?;

    if !response.status().is_success() {
        return Err(Error::DownloadStatus(response.status()));
    }

    let total_size = response.content_length().filter(|&len| len > 0);
    tracing::debug!(status = %response.status(), ?total_size, "download started");
    on_start(total_size);

    let mut file = BufWriter::new(File::create(path)?);
    let downloaded = copy_with_progress(&mut response, &mut file, total_size, progress_cb);

    file.flush()?;
    file.get_ref().sync_all()?;

    downloaded
}

/// Copies `reader` into `writer` in fixed-size blocks, reporting progress
/// against `total_size`. A declared size that differs from the bytes read is
/// `Error::SizeMismatch`.
pub fn copy_with_progress<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    total_size: Option<u64>,
    progress_cb: impl Fn(u64, Progress),
) -> Result<u64> {
    let mut downloaded: u64 = 0;
    let mut buffer = [0; BLOCK_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
        downloaded += bytes_read as u64;

        let progress = match total_size {
            Some(total) => Progress::Determinate((downloaded as f64 / total as f64) as f32),
            None => Progress::Indeterminate,
        };
        progress_cb(downloaded, progress);
    }

    if let Some(expected) = total_size {
        if downloaded != expected {
            return Err(Error::SizeMismatch {
                expected,
                received: downloaded,
            });
        }
    }

    Ok(downloaded)
}
