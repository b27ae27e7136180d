pub mod last_departure;
pub mod weekend;
