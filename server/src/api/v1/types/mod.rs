pub mod queries;
pub mod responses;
