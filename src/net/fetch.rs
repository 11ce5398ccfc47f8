/// Why a fetch did not produce a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Transport failure or unusable address.
    Network,
    /// Server answered with a non-2xx status.
    Status(u16),
    /// Body could not be read as text.
    Body,
}

/// Error during fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Network,
            message: message.into(),
        }
    }

    pub fn status(path: &str, status: u16) -> Self {
        Self {
            kind: FetchErrorKind::Status(status),
            message: format!("fetch {} {}", path, status),
        }
    }

    pub fn body(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Body,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FetchError {}

/// "Fetch a URL, get text."
///
/// Paths are site-rooted (`/writeups/posts/index.json`). Implementations
/// must report non-2xx responses as [`FetchErrorKind::Status`].
pub trait Fetcher: Send + Sync {
    fn fetch_text(&self, path: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP fetcher rooted at a site origin.
#[cfg(feature = "http")]
pub struct HttpFetcher {
    origin: url::Url,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    pub fn new(origin: &str, config: &crate::config::NavConfig) -> Result<Self, FetchError> {
        // Normalize origin
        let origin = if !origin.starts_with("http://") && !origin.starts_with("https://") {
            format!("https://{}", origin)
        } else {
            origin.to_string()
        };

        let origin = url::Url::parse(&origin)
            .map_err(|e| FetchError::network(format!("Invalid origin: {}", e)))?;

        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::network(format!("Client error: {}", e)))?;

        Ok(Self { origin, client })
    }

    pub fn origin(&self) -> &url::Url {
        &self.origin
    }
}

#[cfg(feature = "http")]
impl Fetcher for HttpFetcher {
    fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let target = self
            .origin
            .join(path)
            .map_err(|e| FetchError::network(format!("Invalid path {}: {}", path, e)))?;

        let response = self
            .client
            .get(target.as_str())
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.9,*/*;q=0.8",
            )
            .header("Cache-Control", "no-cache")
            .send()
            .map_err(|e| FetchError::network(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(path, status.as_u16()));
        }

        response
            .text()
            .map_err(|e| FetchError::body(format!("Failed to read body: {}", e)))
    }
}
