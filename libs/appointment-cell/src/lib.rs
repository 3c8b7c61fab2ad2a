pub mod directory;
pub mod models;
pub mod services;

pub use directory::{AppointmentDirectory, HttpAppointmentDirectory};
pub use models::*;
pub use services::*;
