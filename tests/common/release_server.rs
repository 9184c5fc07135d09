//! Minimal HTTP/1.1 server standing in for the GitHub API and asset host.
//!
//! Serves one release JSON under `/repos/.../releases/tags/...` and the asset
//! body under `/download/<name>` and `/mirror/<name>`. Every response closes
//! the connection.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ReleaseServerOptions {
    pub asset_name: String,
    /// `updated_at` of the asset, e.g. "2024-01-01T00:00:00Z".
    pub updated_at: String,
    pub body: Vec<u8>,
    /// Status returned by the release endpoint.
    pub api_status: u16,
    /// Declare more bytes than are sent for the asset.
    pub truncate_body: bool,
    /// Send the asset with `Transfer-Encoding: chunked` and no `Content-Length`.
    pub chunked: bool,
}

impl ReleaseServerOptions {
    pub fn new(asset_name: &str, updated_at: &str, body: &[u8]) -> Self {
        Self {
            asset_name: asset_name.to_string(),
            updated_at: updated_at.to_string(),
            body: body.to_vec(),
            api_status: 200,
            truncate_body: false,
            chunked: false,
        }
    }
}

pub struct ReleaseServer {
    pub base_url: String,
    api_hits: Arc<AtomicUsize>,
    asset_hits: Arc<AtomicUsize>,
    mirror_hits: Arc<AtomicUsize>,
}

impl ReleaseServer {
    pub fn api_hits(&self) -> usize {
        self.api_hits.load(Ordering::SeqCst)
    }

    pub fn asset_hits(&self) -> usize {
        self.asset_hits.load(Ordering::SeqCst)
    }

    pub fn mirror_hits(&self) -> usize {
        self.mirror_hits.load(Ordering::SeqCst)
    }

    pub fn mirror_url(&self, asset_name: &str) -> String {
        format!("{}/mirror/{}", self.base_url, asset_name)
    }
}

/// Starts the server on an ephemeral port. It runs until the process exits.
pub fn start(opts: ReleaseServerOptions) -> ReleaseServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let base_url = format!("http://127.0.0.1:{}", port);

    let release_json = format!(
        r#"{{"tag_name":"LTS","published_at":"2023-12-31T00:00:00Z","assets":[{{"name":"{name}","updated_at":"{updated}","size":{size},"browser_download_url":"{base}/download/{name}"}}]}}"#,
        name = opts.asset_name,
        updated = opts.updated_at,
        size = opts.body.len(),
        base = base_url,
    );

    let api_hits = Arc::new(AtomicUsize::new(0));
    let asset_hits = Arc::new(AtomicUsize::new(0));
    let mirror_hits = Arc::new(AtomicUsize::new(0));
    let server = ReleaseServer {
        base_url,
        api_hits: Arc::clone(&api_hits),
        asset_hits: Arc::clone(&asset_hits),
        mirror_hits: Arc::clone(&mirror_hits),
    };

    let opts = Arc::new(opts);
    let release_json = Arc::new(release_json);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let opts = Arc::clone(&opts);
            let release_json = Arc::clone(&release_json);
            let hits = Hits {
                api: Arc::clone(&api_hits),
                asset: Arc::clone(&asset_hits),
                mirror: Arc::clone(&mirror_hits),
            };
            thread::spawn(move || handle(stream, &opts, &release_json, &hits));
        }
    });

    server
}

struct Hits {
    api: Arc<AtomicUsize>,
    asset: Arc<AtomicUsize>,
    mirror: Arc<AtomicUsize>,
}

fn handle(mut stream: TcpStream, opts: &ReleaseServerOptions, release_json: &str, hits: &Hits) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("");

    if path.starts_with("/repos/") && path.contains("/releases/tags/") {
        hits.api.fetch_add(1, Ordering::SeqCst);
        if opts.api_status != 200 {
            write_response(&mut stream, opts.api_status, "application/json", b"{}", 2);
        } else {
            let body = release_json.as_bytes();
            write_response(&mut stream, 200, "application/json", body, body.len());
        }
        return;
    }

    let is_download = path == format!("/download/{}", opts.asset_name);
    let is_mirror = path == format!("/mirror/{}", opts.asset_name);
    if is_download || is_mirror {
        if is_mirror {
            hits.mirror.fetch_add(1, Ordering::SeqCst);
        } else {
            hits.asset.fetch_add(1, Ordering::SeqCst);
        }
        if opts.chunked {
            write_chunked(&mut stream, &opts.body);
            return;
        }
        let declared = if opts.truncate_body {
            opts.body.len() + 16
        } else {
            opts.body.len()
        };
        write_response(
            &mut stream,
            200,
            "application/octet-stream",
            &opts.body,
            declared,
        );
        return;
    }

    write_response(&mut stream, 404, "text/plain", b"not found", 9);
}

fn write_response(
    stream: &mut TcpStream,
    status: u16,
    content_type: &str,
    body: &[u8],
    content_length: usize,
) {
    let reason = match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Error",
    };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status, reason, content_type, content_length
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

fn write_chunked(stream: &mut TcpStream, body: &[u8]) {
    let head = "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n";
    let _ = stream.write_all(head.as_bytes());
    for chunk in body.chunks(1024) {
        let _ = stream.write_all(format!("{:x}\r\n", chunk.len()).as_bytes());
        let _ = stream.write_all(chunk);
        let _ = stream.write_all(b"\r\n");
    }
    let _ = stream.write_all(b"0\r\n\r\n");
    let _ = stream.flush();
}
