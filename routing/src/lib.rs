pub mod errors;
pub mod queries;
pub mod scoring;
