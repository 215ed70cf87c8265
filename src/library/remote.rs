//! Download remote tracks to local files.
//!
//! Downloads run on their own thread; the result comes back to the control
//! thread as a [`PlayerEvent::Fetched`] so the library is only ever touched
//! there.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::RemoteSettings;
use crate::events::PlayerEvent;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not a downloadable URL: {0}")]
    InvalidUrl(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("could not save download: {0}")]
    Io(#[from] io::Error),
}

/// Something that turns a URL into a local file path.
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> Result<PathBuf, FetchError>;
}

/// Plain HTTP(S) downloads through a shared `ureq` agent.
pub struct HttpFetcher {
    agent: ureq::Agent,
    download_dir: PathBuf,
}

impl HttpFetcher {
    pub fn new(settings: &RemoteSettings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build();
        let download_dir = settings
            .download_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);

        Self {
            agent,
            download_dir,
        }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<PathBuf, FetchError> {
        let name = file_name_from_url(url).ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?;

        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Err(FetchError::Status(code)),
            Err(ureq::Error::Transport(transport)) => {
                return Err(FetchError::Transport(transport.to_string()));
            }
        };
        if response.status() != 200 {
            return Err(FetchError::Status(response.status()));
        }

        fs::create_dir_all(&self.download_dir)?;
        let path = self.download_dir.join(name);

        // Stream into a scratch file next to the target; an interrupted body
        // deletes it on drop and leaves whatever was at `path` untouched.
        let mut partial = NamedTempFile::new_in(&self.download_dir)?;
        io::copy(&mut response.into_reader(), partial.as_file_mut())?;
        partial.persist(&path).map_err(|e| e.error)?;

        Ok(path)
    }
}

/// Last path segment of an `http(s)` URL, percent-decoded.
///
/// Returns `None` when the URL has no usable file name, or when the decoded
/// name would escape the download directory.
pub(crate) fn file_name_from_url(url: &str) -> Option<String> {
    let rest = url
        .trim()
        .strip_prefix("https://")
        .or_else(|| url.trim().strip_prefix("http://"))?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let (_host, path) = rest.split_once('/')?;
    let raw = path.rsplit('/').next()?;
    let name = urlencoding::decode(raw).ok()?.trim().to_string();

    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return None;
    }
    Some(name)
}

/// Download `url` on a background thread and report back through `events`.
pub fn spawn_fetch<F>(fetcher: Arc<F>, url: String, events: Sender<PlayerEvent>)
where
    F: Fetch + ?Sized + 'static,
{
    thread::spawn(move || {
        let result = fetcher.fetch(&url);
        match &result {
            Ok(path) => info!(%url, path = %path.display(), "download finished"),
            Err(e) => warn!(%url, error = %e, "download failed"),
        }
        let _ = events.send(PlayerEvent::Fetched { url, result });
    });
}
