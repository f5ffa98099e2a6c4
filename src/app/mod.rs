pub mod replay;

pub use replay::{ReplayReport, ScenarioRunner, StepReport, StepResult};
