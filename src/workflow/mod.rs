pub mod consolidation_flow;
pub mod evaluation_flow;
pub mod problem_flow;
pub mod progress_flow;

pub use consolidation_flow::{ConsolidationFlow, ConsolidationOutcome};
pub use evaluation_flow::EvaluationFlow;
pub use problem_flow::ProblemFlow;
pub use progress_flow::{pending_scores, ProgressFlow, ProgressTracker, StepAccess, StepRequirements};
