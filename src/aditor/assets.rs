//! Image reference resolution
//!
//!     Notes reference images either by URLs served from the notes workspace (for example
//!     `http://localhost:8080/static/img/a.png`) or by other references. The editor wants image
//!     bytes inline, so the resolver rewrites references while the document is parsed:
//!
//!         - http(s) URLs: everything after the first occurrence of the intercept segment
//!           (`static` by default) is taken as a path under the base path, and the file is
//!           embedded as a `data:image/...;base64,` URI.
//!         - anything else: handed to the [RemoteFetcher]; the fetched body is embedded as plain
//!           base64.
//!
//!     Resolution never fails. A missing file, an unsupported extension or a failed fetch all
//!     leave the reference unchanged.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

pub const DEFAULT_INTERCEPT: &str = "static";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Error returned by a [RemoteFetcher]. Only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("remote fetching is disabled")]
    Disabled,
    #[error("no HTTP client available")]
    NoClient,
}

/// Source of remote asset bytes.
pub trait RemoteFetcher: Send + Sync {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP GET with a request timeout.
///
/// The client is built once. Every use of it (building, requests, dropping) runs on a short-lived
/// thread of its own, so the fetcher also works when the conversion is driven from a task of an
/// async runtime.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Option<reqwest::blocking::Client>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let built = off_runtime(|| reqwest::blocking::Client::builder().timeout(timeout).build());
        let client = match built {
            Ok(client) => Some(client),
            Err(err) => {
                tracing::warn!(error = %err, "failed to build HTTP client, remote images stay as written");
                None
            }
        };
        Self { client }
    }

    /// Fetch through an already configured client.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self {
            client: Some(client),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

impl RemoteFetcher for HttpFetcher {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, FetchError> {
        let client = self.client.as_ref().ok_or(FetchError::NoClient)?;
        off_runtime(|| -> Result<Vec<u8>, FetchError> {
            let response = client.get(reference).send()?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            Ok(response.bytes()?.to_vec())
        })
    }
}

impl Drop for HttpFetcher {
    fn drop(&mut self) {
        // The blocking client shuts down its own runtime on drop
        if let Some(client) = self.client.take() {
            off_runtime(move || drop(client));
        }
    }
}

/// Run `f` on a scoped thread outside any async runtime context and wait for it.
fn off_runtime<T, F>(f: F) -> T
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    thread::scope(|scope| match scope.spawn(f).join() {
        Ok(value) => value,
        Err(payload) => std::panic::resume_unwind(payload),
    })
}

/// Fetcher for offline conversions: every fetch fails, so references stay as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetch;

impl RemoteFetcher for NoFetch {
    fn fetch(&self, _reference: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Disabled)
    }
}

/// Rewrites image references into embeddable data.
pub struct AssetResolver {
    base_path: PathBuf,
    intercept: String,
    fetcher: Box<dyn RemoteFetcher>,
}

impl AssetResolver {
    pub fn new(base_path: impl Into<PathBuf>, intercept: impl Into<String>) -> Self {
        Self::with_fetcher_for(base_path, intercept, HttpFetcher::default())
    }

    /// Resolver that never touches the network.
    pub fn offline(base_path: impl Into<PathBuf>, intercept: impl Into<String>) -> Self {
        Self::with_fetcher_for(base_path, intercept, NoFetch)
    }

    /// Resolver fetching remote references through `fetcher`.
    pub fn with_fetcher_for(
        base_path: impl Into<PathBuf>,
        intercept: impl Into<String>,
        fetcher: impl RemoteFetcher + 'static,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            intercept: intercept.into(),
            fetcher: Box::new(fetcher),
        }
    }

    pub fn with_fetcher(mut self, fetcher: impl RemoteFetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn intercept(&self) -> &str {
        &self.intercept
    }

    /// Resolve an image reference, or return it unchanged.
    pub fn resolve(&self, source: &str) -> String {
        if is_http_url(source) {
            self.embed_local(source)
        } else {
            self.embed_remote(source)
        }
    }

    /// Local file an http(s) reference points at, if it names the intercept segment.
    pub fn local_path(&self, source: &str) -> Option<PathBuf> {
        let index = source.find(self.intercept.as_str())?;
        let relative = &source[index + self.intercept.len()..];
        let mut path = self.base_path.clone();
        for segment in relative.split('/').filter(|segment| !segment.is_empty()) {
            path.push(segment);
        }
        Some(path)
    }

    fn embed_remote(&self, source: &str) -> String {
        match self.fetcher.fetch(source) {
            Ok(bytes) => STANDARD.encode(bytes),
            Err(err) => {
                tracing::debug!(reference = source, error = %err, "keeping unfetched image reference");
                source.to_string()
            }
        }
    }

    fn embed_local(&self, source: &str) -> String {
        let Some(path) = self.local_path(source) else {
            tracing::debug!(reference = source, intercept = %self.intercept, "intercept segment not found");
            return source.to_string();
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "image file does not exist");
            return source.to_string();
        }
        let Some(mime) = mime_for(&path) else {
            tracing::debug!(path = %path.display(), "unsupported image extension");
            return source.to_string();
        };
        match fs::read(&path) {
            Ok(bytes) => format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "failed to read image file");
                source.to_string()
            }
        }
    }
}

impl Default for AssetResolver {
    fn default() -> Self {
        Self::new("/", DEFAULT_INTERCEPT)
    }
}

impl fmt::Debug for AssetResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetResolver")
            .field("base_path", &self.base_path)
            .field("intercept", &self.intercept)
            .finish_non_exhaustive()
    }
}

/// Resolve `source` against `base_path` with the default HTTP fetcher.
pub fn resolve(source: &str, base_path: &str, intercept: &str) -> String {
    AssetResolver::new(base_path, intercept).resolve(source)
}

pub fn is_http_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// MIME type for the supported image extensions.
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}
