//! Local step interpreter
//!
//! A [`PipelineBuilder`] runs stages of steps in order. Steps read their
//! inputs from a shared [`PipelineContext`](crate::core::PipelineContext),
//! either as literals (`by: val`) or by key (`by: ref`), and write their
//! results back under the declared output names.

pub mod builder;
pub mod env;
pub mod kinds;
pub mod params;
pub mod registry;
pub mod stage;
pub mod step;

pub use builder::PipelineBuilder;
pub use env::StepEnv;
pub use kinds::StepKind;
pub use params::{get_value_from_context, ParamSource, StepInput, StepOutput};
pub use registry::{FunctionRegistry, StepFunction};
pub use stage::PipelineStage;
pub use step::PipelineStep;
