pub mod auth_service;
pub mod coordinator_service;
pub mod evaluation_service;
pub mod evaluator_service;
pub mod problem_service;
pub mod progress_service;
pub mod score_service;
pub mod upload_service;

pub use auth_service::AuthService;
pub use coordinator_service::CoordinatorService;
pub use evaluation_service::EvaluationService;
pub use evaluator_service::EvaluatorService;
pub use problem_service::ProblemService;
pub use progress_service::ProgressService;
pub use score_service::ScoreService;
pub use upload_service::{validate_image, UploadService};
