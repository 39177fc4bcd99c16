//! Entity services
//!
//! Thin composition of validation, the store adapter, and the relationship
//! index. These are the operations the HTTP layer calls into.

pub mod assignments;
pub mod availabilities;
pub mod duties;
pub mod events;

pub use assignments::AssignmentService;
pub use availabilities::AvailabilityService;
pub use duties::DutyService;
pub use events::EventService;
