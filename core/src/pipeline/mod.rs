//! Sequential multi-agent task pipeline.
//!
//! ```text
//! CrewConfig
//!   ↓ CrewBuilder::build()
//! Vec<Task> → TaskGraph::validate() → topological_order()
//!   ↓
//! Pipeline::run(inputs)
//!   validate inputs → for each task: render → gather context → agent.respond
//!   ↓
//! PipelineRun { results, final_output }
//! ```

mod builder;
mod engine;
mod graph;
mod observer;
mod progress;
mod scheduler;
mod state;
mod types;

pub use builder::CrewBuilder;
pub use engine::Pipeline;
pub use graph::{TaskGraph, TaskLike};
pub use observer::{PipelineEvent, PipelineObserver};
pub use progress::{ProgressMonitor, ProgressObserver};
pub use scheduler::{run_ordered, OrderedBuffer};
pub use state::{PhaseTransition, PipelinePhase, TransitionError};
pub use types::{ExecutionResult, InputValue, Inputs, PipelineRun, RenderedTask};
