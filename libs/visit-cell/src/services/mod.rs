pub mod conflict;
pub mod scheduler;
pub mod time;

pub use conflict::ConflictDetectionService;
pub use scheduler::VisitSchedulerService;
