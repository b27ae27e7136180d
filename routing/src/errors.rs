use std::fmt;
use std::fmt::Display;
use upstream::UpstreamError;

pub type QueryResult<O> = Result<O, QueryError>;

#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    Upstream(#[from] UpstreamError),
    NoDepartureFound,
    NoWeekendOptions,
}

impl Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let err: &dyn Display = match self {
            QueryError::Upstream(err) => err,
            QueryError::NoDepartureFound => &"No departure found on the same day",
            QueryError::NoWeekendOptions => &"No weekend trip survived the candidate search",
        };
        write!(f, "{}", err)
    }
}
