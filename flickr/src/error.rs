#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to create base url")]
    Url(#[from] url::ParseError),
    #[error("error with json format")]
    Json(#[from] serde_json::Error),
    #[error("error with json format: {0}")]
    Format(&'static str),
    #[error("{0}")]
    Flickr(String),
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(u16, String),
    #[error("request cancelled")]
    Cancelled,
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Error::Json(_) | Error::Format(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
