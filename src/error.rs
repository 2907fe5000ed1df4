use thiserror::Error;

/// A page that could not be turned into a document. The crawl logs it and
/// moves on; nothing is retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not read body of {url}: {reason}")]
    Body { url: String, reason: String },
}

impl FetchError {
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = err.status() {
            FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }
}
