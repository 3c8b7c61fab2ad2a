pub mod clock;
pub mod directory;
pub mod models;
pub mod services;

// Re-export all models and services for external use
pub use clock::{Clock, FixedClock, SystemClock};
pub use directory::{HttpSlotDirectory, SlotDirectory};
pub use models::*;
pub use services::*;
