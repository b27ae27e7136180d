use std::fmt;
use std::fmt::Display;

pub type UpstreamResult<T> = Result<T, UpstreamError>;

#[derive(thiserror::Error, Debug)]
pub enum UpstreamError {
    Reqwest(#[from] reqwest::Error),
    Status { service: &'static str, status: u16 },
    Url(#[from] url::ParseError),
}

impl Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UpstreamError::Reqwest(err) => write!(f, "{}", err),
            UpstreamError::Status { service, status } => write!(f, "{} request failed ({})", service, status),
            UpstreamError::Url(err) => write!(f, "Invalid upstream URL: {}", err),
        }
    }
}
