pub mod processor;
pub mod scheduler;

pub use processor::TileProcessor;
pub use scheduler::{Progress, Scheduler};
