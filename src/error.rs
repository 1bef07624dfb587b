use thiserror::Error;

#[derive(Error, Debug)]
pub enum GarimpoError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] Box<ureq::Error>),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    ConfigWriteError(#[from] toml::ser::Error),

    #[error("Image decode error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Unsupported store URL: {0}")]
    UnsupportedPlatform(String),

    #[error("Browser render failed: {0}")]
    RenderError(String),

    #[error("External tool unavailable: {0}")]
    ToolUnavailable(String),

    #[error("Video capture failed: {0}")]
    RemuxError(String),

    #[error("Invalid input: {0}")]
    InputInvalid(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl GarimpoError {
    /// User-friendly hint for common failure modes.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            GarimpoError::UnsupportedPlatform(_) => {
                Some("Run 'garimpo platforms' to see the supported stores")
            }
            GarimpoError::RenderError(_) => Some(
                "Browser rendering needs Node.js with Playwright installed \
                 (npm install playwright). Retry with --engine http to skip rendering.",
            ),
            GarimpoError::ToolUnavailable(_) => {
                Some("Install ffmpeg to capture streaming (HLS) product videos")
            }
            GarimpoError::RemuxError(_) => {
                Some("The stream URL may have expired; re-run the scrape to refresh it")
            }
            GarimpoError::HttpError(_) => {
                Some("Check your network connection, or retry with --engine browser")
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GarimpoError>;

impl From<ureq::Error> for GarimpoError {
    fn from(err: ureq::Error) -> Self {
        GarimpoError::HttpError(Box::new(err))
    }
}
