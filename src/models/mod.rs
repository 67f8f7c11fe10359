pub mod cause;
pub mod responses;
