pub mod appointments;
pub mod lifecycle;
pub mod rescheduling;
pub mod session;

pub use appointments::AppointmentService;
pub use lifecycle::AppointmentLifecycleService;
pub use rescheduling::ReschedulingCoordinator;
pub use session::ReschedulingSession;
