//! 评估员服务 - 业务能力层
//!
//! 分配/移除评估员前的两条客户端规则在这里执行，违反时不发出请求：
//! - 每个评估最多 `max_evaluators_per_evaluation` 名评估员
//! - 已登记问题的评估员不能移除

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::clients::{decode, decode_list, encode, RestApi};
use crate::config::Config;
use crate::error::{AppResult, ValidationError};
use crate::models::{EvaluationId, Evaluator, EvaluatorId, NewAccount, Problem};

/// 评估员服务
pub struct EvaluatorService {
    api: Arc<dyn RestApi>,
    max_per_evaluation: usize,
}

impl EvaluatorService {
    pub fn new(api: Arc<dyn RestApi>, config: &Config) -> Self {
        Self {
            api,
            max_per_evaluation: config.max_evaluators_per_evaluation,
        }
    }

    /// 所有评估员账户
    pub async fn list(&self) -> AppResult<Vec<Evaluator>> {
        let endpoint = "evaluadores";
        decode_list(endpoint, self.api.get(endpoint).await?)
    }

    /// 创建评估员账户
    pub async fn create(&self, account: &NewAccount) -> AppResult<Evaluator> {
        account.validate()?;
        let endpoint = "evaluadores";
        let created: Evaluator =
            decode(endpoint, self.api.post(endpoint, &encode(endpoint, account)?).await?)?;
        info!("✓ 评估员已创建: {}", created.full_name());
        Ok(created)
    }

    /// 评估中已分配的评估员
    pub async fn list_for_evaluation(&self, evaluation: EvaluationId) -> AppResult<Vec<Evaluator>> {
        let endpoint = format!("evaluaciones/{}/evaluadores", evaluation);
        decode_list(&endpoint, self.api.get(&endpoint).await?)
    }

    /// 分配评估员
    pub async fn assign(&self, evaluation: EvaluationId, evaluator: EvaluatorId) -> AppResult<()> {
        let assigned = self.list_for_evaluation(evaluation).await?;
        check_can_assign(&assigned, evaluator, self.max_per_evaluation)?;

        let endpoint = format!("evaluaciones/{}/evaluadores", evaluation);
        self.api
            .post(&endpoint, &json!({ "evaluadorId": evaluator }))
            .await?;
        info!(
            "✓ 评估员 {} 已分配到评估 {} ({}/{})",
            evaluator,
            evaluation,
            assigned.len() + 1,
            self.max_per_evaluation
        );
        Ok(())
    }

    /// 评估员在评估中登记的问题数
    pub async fn problem_count(&self, evaluation: EvaluationId, evaluator: EvaluatorId) -> AppResult<usize> {
        let endpoint = format!("evaluaciones/{}/evaluadores/{}/problemas", evaluation, evaluator);
        let problems: Vec<Problem> = decode_list(&endpoint, self.api.get(&endpoint).await?)?;
        Ok(problems.len())
    }

    /// 移除评估员
    pub async fn remove(&self, evaluation: EvaluationId, evaluator: EvaluatorId) -> AppResult<()> {
        let count = self.problem_count(evaluation, evaluator).await?;
        if count > 0 {
            warn!(
                "⚠️ 评估员 {} 在评估 {} 中已有 {} 个问题，拒绝移除",
                evaluator, evaluation, count
            );
            return Err(ValidationError::EvaluatorHasProblems { count }.into());
        }

        let endpoint = format!("evaluaciones/{}/evaluadores/{}", evaluation, evaluator);
        self.api.delete(&endpoint).await?;
        info!("✓ 评估员 {} 已从评估 {} 移除", evaluator, evaluation);
        Ok(())
    }
}

/// 分配前检查：重复分配和人数上限
pub fn check_can_assign(
    assigned: &[Evaluator],
    evaluator: EvaluatorId,
    limit: usize,
) -> Result<(), ValidationError> {
    if assigned.iter().any(|e| e.id == evaluator) {
        return Err(ValidationError::EvaluatorAlreadyAssigned);
    }
    if assigned.len() >= limit {
        return Err(ValidationError::EvaluatorLimitReached { limit });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluators(n: i64) -> Vec<Evaluator> {
        (1..=n)
            .map(|i| Evaluator {
                id: EvaluatorId(i),
                name: format!("Evaluador {}", i),
                last_name: String::new(),
                email: format!("e{}@uni.edu", i),
            })
            .collect()
    }

    #[test]
    fn test_sixth_evaluator_rejected() {
        assert!(check_can_assign(&evaluators(4), EvaluatorId(99), 5).is_ok());
        assert!(matches!(
            check_can_assign(&evaluators(5), EvaluatorId(99), 5),
            Err(ValidationError::EvaluatorLimitReached { limit: 5 })
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        assert!(matches!(
            check_can_assign(&evaluators(2), EvaluatorId(2), 5),
            Err(ValidationError::EvaluatorAlreadyAssigned)
        ));
    }
}
