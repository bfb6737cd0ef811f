//! 评估生命周期：结束、带级联提示的删除

use futures::try_join;
use tracing::{info, warn};

use crate::error::{AppResult, WorkflowError};
use crate::models::{DeletionImpact, Evaluation, EvaluationId};
use crate::services::{EvaluationService, EvaluatorService, ProblemService};

pub struct EvaluationFlow<'a> {
    evaluations: &'a EvaluationService,
    evaluators: &'a EvaluatorService,
    problems: &'a ProblemService,
}

impl<'a> EvaluationFlow<'a> {
    pub fn new(
        evaluations: &'a EvaluationService,
        evaluators: &'a EvaluatorService,
        problems: &'a ProblemService,
    ) -> Self {
        Self {
            evaluations,
            evaluators,
            problems,
        }
    }

    /// 删除会级联移除的内容
    pub async fn deletion_impact(&self, id: EvaluationId) -> AppResult<DeletionImpact> {
        let (problems, evaluators) = try_join!(
            self.problems.list_for_evaluation(id),
            self.evaluators.list_for_evaluation(id)
        )?;
        Ok(DeletionImpact {
            problems: problems.len(),
            evaluators: evaluators.len(),
        })
    }

    /// 删除评估；未确认时返回级联提示
    pub async fn delete(&self, id: EvaluationId, confirmed: bool) -> AppResult<DeletionImpact> {
        let impact = self.deletion_impact(id).await?;
        if !confirmed {
            warn!(
                "⚠️ 删除评估 {} 将同时移除 {} 个问题和 {} 个评估员分配",
                id, impact.problems, impact.evaluators
            );
            return Err(WorkflowError::CascadeNotConfirmed {
                problems: impact.problems,
                evaluators: impact.evaluators,
            }
            .into());
        }

        self.evaluations.delete(id).await?;
        info!("✓ 评估 {} 及其 {} 个问题已删除", id, impact.problems);
        Ok(impact)
    }

    pub async fn finalize(&self, id: EvaluationId) -> AppResult<Evaluation> {
        self.evaluations.finalize(id).await
    }
}
