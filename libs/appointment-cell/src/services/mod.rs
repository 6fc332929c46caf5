pub mod appointments;
pub mod availability;
pub mod booking;
pub mod lifecycle;

pub use appointments::AppointmentService;
pub use availability::AvailabilityService;
pub use booking::BookingGate;
pub use lifecycle::AppointmentLifecycleService;
