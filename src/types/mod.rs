pub mod price;
pub mod reading;
pub mod symbol;
