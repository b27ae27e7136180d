pub mod errors;
pub mod finder;
pub mod messages;
pub mod types;
