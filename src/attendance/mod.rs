pub mod batch;
pub mod recorder;
pub mod rules;

pub use batch::{GenerationReport, RollupReport};
pub use recorder::{ClockInResult, ClockOutResult};
