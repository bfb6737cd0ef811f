//! 评分服务

use std::sync::Arc;

use tracing::info;

use crate::clients::{decode_list, encode, RestApi};
use crate::error::AppResult;
use crate::models::{EvaluationId, EvaluatorId, ProblemId, Score, ScoreInput};

pub struct ScoreService {
    api: Arc<dyn RestApi>,
}

impl ScoreService {
    pub fn new(api: Arc<dyn RestApi>) -> Self {
        Self { api }
    }

    /// 评估中所有评估员的所有评分
    pub async fn list_for_evaluation(&self, evaluation: EvaluationId) -> AppResult<Vec<Score>> {
        let endpoint = format!("evaluaciones/{}/puntuaciones", evaluation);
        decode_list(&endpoint, self.api.get(&endpoint).await?)
    }

    /// 提交评分，频率和严重度都必须在 0..=4
    ///
    /// 返回后端给出的危急度（响应中没有时为 `None`）
    pub async fn submit(
        &self,
        problem: ProblemId,
        evaluator: EvaluatorId,
        frequency: i64,
        severity: i64,
    ) -> AppResult<Option<f64>> {
        let input = ScoreInput::new(frequency, severity)?;
        let endpoint = format!("problemas/{}/puntuaciones/{}", problem, evaluator);
        let reply = self.api.put(&endpoint, &encode(&endpoint, &input)?).await?;
        info!(
            "✓ 问题 {} 评分已保存: 频率 {} 严重度 {}",
            problem, frequency, severity
        );
        Ok(reply.get("criticidad").and_then(|v| v.as_f64()))
    }
}
