//! 进度服务：读取/写入 (评估, 评估员) 的步骤值

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::clients::{decode, RestApi};
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{EvaluationId, EvaluatorId, Progress, Step};

pub struct ProgressService {
    api: Arc<dyn RestApi>,
}

impl ProgressService {
    pub fn new(api: Arc<dyn RestApi>) -> Self {
        Self { api }
    }

    fn endpoint(evaluation: EvaluationId, evaluator: EvaluatorId) -> String {
        format!("evaluaciones/{}/evaluadores/{}/progreso", evaluation, evaluator)
    }

    /// 读取进度；后端没有记录时视为步骤 1
    pub async fn get(&self, evaluation: EvaluationId, evaluator: EvaluatorId) -> AppResult<Step> {
        let endpoint = Self::endpoint(evaluation, evaluator);
        match self.api.get(&endpoint).await {
            Ok(value) if value.is_null() => Ok(Step::FindingProblems),
            Ok(value) => {
                let progress: Progress = decode(&endpoint, value)?;
                Ok(progress.step)
            }
            Err(AppError::Api(ApiError::NotFound { .. })) => {
                debug!("评估 {} 评估员 {} 尚无进度记录", evaluation, evaluator);
                Ok(Step::FindingProblems)
            }
            Err(e) => Err(e),
        }
    }

    /// 覆盖写入进度（无并发校验，后写入者生效）
    pub async fn put(&self, evaluation: EvaluationId, evaluator: EvaluatorId, step: Step) -> AppResult<()> {
        let endpoint = Self::endpoint(evaluation, evaluator);
        self.api.put(&endpoint, &json!({ "paso": step })).await?;
        info!("✓ 评估 {} 评估员 {} 进度已更新为 {}", evaluation, evaluator, step);
        Ok(())
    }
}
