pub mod evaluation;
pub mod evaluator;
pub mod heuristic;
pub mod ids;
pub mod problem;
pub mod progress;
pub mod role;
pub mod score;

pub use evaluation::{DeletionImpact, Evaluation, EvaluationConfig, NewEvaluation};
pub use evaluator::{Assignment, Coordinator, Evaluator, NewAccount};
pub use heuristic::Heuristic;
pub use ids::{CoordinatorId, EvaluationId, EvaluatorId, ProblemId};
pub use problem::{ChangeLogEntry, FieldChange, NewProblem, Problem, ProblemDraft, ProblemUpdate};
pub use progress::{Progress, Step};
pub use role::Role;
pub use score::{Score, ScoreInput, ScoreValue};

use serde::Deserialize;

/// 上传接口返回的存储路径
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UploadedImage {
    #[serde(rename = "ruta", alias = "path")]
    pub path: String,
}
