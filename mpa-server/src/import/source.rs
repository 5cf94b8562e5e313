//! Dataset location and fetching

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::ImportError;

/// Where the zone dataset comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// `http://` or `https://` URL
    Remote(String),
    /// Local GeoJSON file (`file://` prefix optional)
    Local(PathBuf),
}

impl DatasetSource {
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            DatasetSource::Remote(location.to_string())
        } else {
            let path = location.strip_prefix("file://").unwrap_or(location);
            DatasetSource::Local(PathBuf::from(path))
        }
    }

    /// Read the raw dataset bytes. Any failure aborts the import.
    pub async fn fetch(&self, client: &reqwest::Client) -> Result<Vec<u8>, ImportError> {
        let fail = |reason: String| ImportError::Fetch {
            location: self.to_string(),
            reason,
        };

        match self {
            DatasetSource::Remote(url) => {
                let response = client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| fail(e.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(fail(format!("HTTP {status}")));
                }
                let body = response.bytes().await.map_err(|e| fail(e.to_string()))?;
                Ok(body.to_vec())
            }
            DatasetSource::Local(path) => tokio::fs::read(path).await.map_err(|e| fail(e.to_string())),
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::Remote(url) => f.write_str(url),
            DatasetSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// HTTP client for dataset downloads (redirects followed by default)
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ImportError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("mpa-server/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ImportError::Fetch {
            location: "http client".into(),
            reason: format!("Failed to build HTTP client: {e}"),
        })
}
