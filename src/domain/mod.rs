pub mod analysis;
pub mod ticket;
