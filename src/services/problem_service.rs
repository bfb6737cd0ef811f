//! 问题服务 - 业务能力层
//!
//! 问题的增删改查和修改历史。每次有实际变化的编辑都会追加一条历史记录

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::clients::{decode, decode_list, encode, RestApi};
use crate::error::AppResult;
use crate::models::problem::next_problem_number;
use crate::models::{
    ChangeLogEntry, EvaluationId, EvaluatorId, NewProblem, Problem, ProblemDraft, ProblemId,
    ProblemUpdate,
};

/// 问题服务
pub struct ProblemService {
    api: Arc<dyn RestApi>,
}

impl ProblemService {
    pub fn new(api: Arc<dyn RestApi>) -> Self {
        Self { api }
    }

    /// 评估中的所有问题
    pub async fn list_for_evaluation(&self, evaluation: EvaluationId) -> AppResult<Vec<Problem>> {
        let endpoint = format!("evaluaciones/{}/problemas", evaluation);
        let mut problems: Vec<Problem> = decode_list(&endpoint, self.api.get(&endpoint).await?)?;
        problems.sort_by_key(|p| p.number);
        Ok(problems)
    }

    /// 某评估员在评估中登记的问题
    pub async fn list_for_evaluator(
        &self,
        evaluation: EvaluationId,
        evaluator: EvaluatorId,
    ) -> AppResult<Vec<Problem>> {
        let endpoint = format!("evaluaciones/{}/evaluadores/{}/problemas", evaluation, evaluator);
        let mut problems: Vec<Problem> = decode_list(&endpoint, self.api.get(&endpoint).await?)?;
        problems.sort_by_key(|p| p.number);
        Ok(problems)
    }

    pub async fn get(&self, id: ProblemId) -> AppResult<Problem> {
        let endpoint = format!("problemas/{}", id);
        decode(&endpoint, self.api.get(&endpoint).await?)
    }

    /// 登记新问题，序号取评估内当前最大序号 + 1
    pub async fn create(
        &self,
        evaluation: EvaluationId,
        evaluator: EvaluatorId,
        draft: &ProblemDraft,
    ) -> AppResult<Problem> {
        draft.validate()?;
        let existing = self.list_for_evaluation(evaluation).await?;
        let number = next_problem_number(&existing);

        let new_problem = NewProblem {
            number,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            heuristic: draft.heuristic,
            example: draft.example.trim().to_string(),
            image: draft.image.clone(),
            evaluator_id: evaluator,
            evaluation_id: evaluation,
            origins: Vec::new(),
        };
        self.insert(&new_problem).await
    }

    /// 直接写入一条完整的问题记录（合并流程使用）
    pub async fn insert(&self, problem: &NewProblem) -> AppResult<Problem> {
        let endpoint = "problemas";
        let created: Problem =
            decode(endpoint, self.api.post(endpoint, &encode(endpoint, problem)?).await?)?;
        info!("✓ 问题 #{} 已登记: {}", created.number, created.title);
        Ok(created)
    }

    /// 编辑问题并追加修改历史
    pub async fn update(
        &self,
        id: ProblemId,
        editor: EvaluatorId,
        update: &ProblemUpdate,
    ) -> AppResult<Problem> {
        let current = self.get(id).await?;
        let changes = update.diff(&current);
        if changes.is_empty() {
            debug!("问题 {} 没有实际变化，跳过更新", id);
            return Ok(current);
        }

        let endpoint = format!("problemas/{}", id);
        let updated: Problem =
            decode(&endpoint, self.api.put(&endpoint, &encode(&endpoint, update)?).await?)?;

        let entry = ChangeLogEntry {
            problem_id: id,
            evaluator_id: editor,
            timestamp: Utc::now(),
            changes,
        };
        self.append_history(&entry).await?;

        info!(
            "✓ 问题 #{} 已更新 ({} 个字段)",
            updated.number,
            entry.changes.len()
        );
        Ok(updated)
    }

    pub async fn delete(&self, id: ProblemId) -> AppResult<()> {
        let endpoint = format!("problemas/{}", id);
        self.api.delete(&endpoint).await?;
        info!("✓ 问题 {} 已删除", id);
        Ok(())
    }

    /// 修改历史
    pub async fn history(&self, id: ProblemId) -> AppResult<Vec<ChangeLogEntry>> {
        let endpoint = format!("problemas/{}/historial", id);
        let mut entries: Vec<ChangeLogEntry> =
            decode_list(&endpoint, self.api.get(&endpoint).await?)?;
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    async fn append_history(&self, entry: &ChangeLogEntry) -> AppResult<()> {
        let endpoint = format!("problemas/{}/historial", entry.problem_id);
        self.api.post(&endpoint, &encode(&endpoint, entry)?).await?;
        Ok(())
    }
}
