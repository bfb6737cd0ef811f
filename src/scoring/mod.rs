//! 评分汇总
//!
//! 纯数据变换：不发请求，输入都是已经从后端取回的数组

pub mod aggregate;
pub mod criticality;
pub mod summary;

pub use aggregate::{aggregate_by_problem, average_scores, ProblemScoreRow, ScoreAverage};
pub use criticality::{tier, CriticalityTier};
pub use summary::{FinalSummary, HeuristicSummary};
