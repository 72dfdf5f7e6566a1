//! CLI command implementations

mod plan;
mod run;

pub use plan::{PlanArgs, cmd_plan};
pub use run::{RunArgs, cmd_run};
