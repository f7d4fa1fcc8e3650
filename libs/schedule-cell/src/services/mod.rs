pub mod availability;
pub mod resolver;
pub mod schedule;

pub use availability::AvailabilityService;
pub use schedule::ScheduleService;
