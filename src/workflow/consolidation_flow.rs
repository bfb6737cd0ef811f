//! 问题合并流程（步骤 2）
//!
//! 先写入合并后的记录，再逐个删除原始问题。没有事务：
//! 删除失败的原始问题会保留，并在结果中列出

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::error::{AppResult, WorkflowError};
use crate::models::{EvaluationId, EvaluatorId, NewProblem, Problem, ProblemDraft, ProblemId};
use crate::services::ProblemService;

/// 合并结果
#[derive(Debug)]
pub struct ConsolidationOutcome {
    pub merged: Problem,
    pub deleted: Vec<ProblemId>,
    /// 删除失败的原始问题及原因
    pub failed_deletes: Vec<(ProblemId, String)>,
}

impl ConsolidationOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed_deletes.is_empty()
    }
}

pub struct ConsolidationFlow<'a> {
    problems: &'a ProblemService,
}

impl<'a> ConsolidationFlow<'a> {
    pub fn new(problems: &'a ProblemService) -> Self {
        Self { problems }
    }

    pub async fn consolidate(
        &self,
        evaluation: EvaluationId,
        evaluator: EvaluatorId,
        sources: &[ProblemId],
        draft: &ProblemDraft,
    ) -> AppResult<ConsolidationOutcome> {
        let unique: BTreeSet<ProblemId> = sources.iter().copied().collect();
        if unique.len() < 2 {
            return Err(WorkflowError::ConsolidationNeedsTwoProblems.into());
        }
        draft.validate()?;

        let mut originals = Vec::with_capacity(unique.len());
        for id in &unique {
            originals.push(self.problems.get(*id).await?);
        }

        let merged_problem = build_merged(evaluation, evaluator, &originals, draft)?;
        let merged = self.problems.insert(&merged_problem).await?;
        info!(
            "✓ 已合并 {} 个问题为 #{}: {}",
            originals.len(),
            merged.number,
            merged.title
        );

        let mut deleted = Vec::new();
        let mut failed_deletes = Vec::new();
        for original in &originals {
            match self.problems.delete(original.id).await {
                Ok(()) => deleted.push(original.id),
                Err(e) => {
                    warn!(
                        "⚠️ 原始问题 {} 删除失败，合并记录 {} 已存在: {}",
                        original.id, merged.id, e
                    );
                    failed_deletes.push((original.id, e.user_message()));
                }
            }
        }

        Ok(ConsolidationOutcome {
            merged,
            deleted,
            failed_deletes,
        })
    }
}

/// 组装合并后的问题：序号取最小的原始序号，记录来源
pub fn build_merged(
    evaluation: EvaluationId,
    evaluator: EvaluatorId,
    originals: &[Problem],
    draft: &ProblemDraft,
) -> Result<NewProblem, WorkflowError> {
    if originals.len() < 2 {
        return Err(WorkflowError::ConsolidationNeedsTwoProblems);
    }
    if originals.iter().any(|p| p.evaluation_id != evaluation) {
        return Err(WorkflowError::ConsolidationAcrossEvaluations);
    }

    let number = originals.iter().map(|p| p.number).min().unwrap_or(1);
    let image = draft
        .image
        .clone()
        .or_else(|| originals.iter().find_map(|p| p.image.clone()));

    Ok(NewProblem {
        number,
        title: draft.title.trim().to_string(),
        description: draft.description.trim().to_string(),
        heuristic: draft.heuristic,
        example: draft.example.trim().to_string(),
        image,
        evaluator_id: evaluator,
        evaluation_id: evaluation,
        origins: originals.iter().map(|p| p.id).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Heuristic;

    fn original(id: i64, number: u32, evaluation: i64, image: Option<&str>) -> Problem {
        Problem {
            id: ProblemId(id),
            number,
            title: format!("Problema {}", id),
            description: "desc".to_string(),
            heuristic: Heuristic::ConsistencyAndStandards,
            example: String::new(),
            image: image.map(str::to_string),
            evaluator_id: EvaluatorId(id),
            evaluation_id: EvaluationId(evaluation),
            origins: Vec::new(),
        }
    }

    fn draft() -> ProblemDraft {
        ProblemDraft {
            title: " Íconos inconsistentes ".to_string(),
            description: "Distintos íconos para la misma acción".to_string(),
            heuristic: Heuristic::ConsistencyAndStandards,
            example: "Barra superior vs. menú lateral".to_string(),
            image: None,
        }
    }

    #[test]
    fn test_merged_takes_smallest_number_and_records_origins() {
        let originals = vec![
            original(5, 7, 1, None),
            original(9, 3, 1, Some("uploads/a.png")),
        ];
        let merged = build_merged(EvaluationId(1), EvaluatorId(2), &originals, &draft()).unwrap();

        assert_eq!(merged.number, 3);
        assert_eq!(merged.title, "Íconos inconsistentes");
        assert_eq!(merged.origins, vec![ProblemId(5), ProblemId(9)]);
        assert_eq!(merged.image.as_deref(), Some("uploads/a.png"));
        assert_eq!(merged.evaluator_id, EvaluatorId(2));
    }

    #[test]
    fn test_rejects_cross_evaluation_merge() {
        let originals = vec![original(5, 1, 1, None), original(9, 2, 2, None)];
        assert!(matches!(
            build_merged(EvaluationId(1), EvaluatorId(2), &originals, &draft()),
            Err(WorkflowError::ConsolidationAcrossEvaluations)
        ));
    }
}
