pub mod availability;
pub mod config;
pub mod slot_generator;

pub use availability::{AvailabilityResolver, BookingWindow};
pub use config::ScheduleConfigService;
pub use slot_generator::SlotGenerator;
