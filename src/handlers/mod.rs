pub mod admin;
pub mod causes;
pub mod donations;
pub mod overview;
