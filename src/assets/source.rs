use std::{
    future::Future,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::{EditorError, EditorResult};

/// Where an image comes from: a URL/path to fetch, or bytes embedded in a `data:` URL.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Path or URL resolved by a [`SourceLoader`].
    Url(String),
    /// Inline payload decoded from a `data:` URL.
    Data {
        /// Declared media type, e.g. `image/png`.
        mime: String,
        /// Raw encoded image bytes.
        bytes: Arc<Vec<u8>>,
    },
}

impl std::fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSource::Url(url) => f.debug_tuple("Url").field(url).finish(),
            ImageSource::Data { mime, bytes } => f
                .debug_struct("Data")
                .field("mime", mime)
                .field("bytes_len", &bytes.len())
                .finish(),
        }
    }
}

impl ImageSource {
    /// Parse a user-facing source string. `data:` URLs are decoded eagerly; everything else is
    /// kept as a URL for a loader to resolve.
    pub fn parse(s: &str) -> EditorResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EditorError::validation("image source must be non-empty"));
        }
        match s.strip_prefix("data:") {
            Some(rest) => parse_data_url(rest),
            None => Ok(ImageSource::Url(s.to_string())),
        }
    }

    /// Short description for logs and notices (never the payload).
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Url(url) => url.clone(),
            ImageSource::Data { mime, bytes } => format!("data:{mime} ({} bytes)", bytes.len()),
        }
    }
}

impl std::str::FromStr for ImageSource {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_data_url(rest: &str) -> EditorResult<ImageSource> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| EditorError::validation("data url is missing ','"))?;
    let (mime, is_base64) = match meta.strip_suffix(";base64") {
        Some(m) => (m, true),
        None => (meta, false),
    };
    let mime = mime.split(';').next().unwrap_or_default();
    let mime = if mime.is_empty() { "text/plain" } else { mime };

    let bytes = if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| EditorError::decode(format!("invalid base64 in data url: {e}")))?
    } else {
        urlencoding::decode_binary(payload.as_bytes()).into_owned()
    };

    Ok(ImageSource::Data {
        mime: mime.to_string(),
        bytes: Arc::new(bytes),
    })
}

/// Capability that turns an [`ImageSource`] into encoded bytes.
///
/// Loads are awaited explicitly by the operations that need them; nothing is fetched in the
/// background.
pub trait SourceLoader {
    /// Fetch the encoded bytes for `source`.
    fn load(&self, source: &ImageSource) -> impl Future<Output = EditorResult<Vec<u8>>>;
}

/// Loader serving `data:` payloads and paths under a fixed asset root.
///
/// Web-root style paths (`/images/logo.svg`) and `file://` URLs are resolved relative to the
/// root; remote URLs are rejected.
#[derive(Clone, Debug)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    /// Serve assets below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Asset root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path a URL-style source resolves to.
    pub fn resolve(&self, url: &str) -> EditorResult<PathBuf> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Err(EditorError::validation(format!(
                "remote image urls are not served by the filesystem loader: {url}"
            )));
        }
        let rel = url.strip_prefix("file://").unwrap_or(url);
        let norm = normalize_rel_path(rel.trim_start_matches('/'))?;
        Ok(self.root.join(Path::new(&norm)))
    }
}

impl SourceLoader for FsLoader {
    async fn load(&self, source: &ImageSource) -> EditorResult<Vec<u8>> {
        match source {
            ImageSource::Data { bytes, .. } => Ok(bytes.as_ref().clone()),
            ImageSource::Url(url) => {
                let path = self.resolve(url)?;
                tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("read image bytes from '{}'", path.display()))
                    .map_err(EditorError::from)
            }
        }
    }
}

/// Normalize and validate root-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> EditorResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(EditorError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(EditorError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(EditorError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(EditorError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
