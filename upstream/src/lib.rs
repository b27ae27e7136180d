mod client;
pub mod error;
pub mod transit;
pub mod weather;
#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use error::{UpstreamError, UpstreamResult};
