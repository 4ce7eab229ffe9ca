pub mod models;

pub use models::{Booking, Bus, Seat};
