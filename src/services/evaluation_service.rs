//! 评估服务 - 业务能力层
//!
//! 每个方法对应一个 REST 端点，只做请求组装和响应解析

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde_json::json;
use tracing::info;

use crate::clients::{decode, decode_list, encode, RestApi};
use crate::error::{AppResult, WorkflowError};
use crate::models::{CoordinatorId, Evaluation, EvaluationConfig, EvaluationId, EvaluatorId, NewEvaluation};

/// 评估服务
pub struct EvaluationService {
    api: Arc<dyn RestApi>,
}

impl EvaluationService {
    pub fn new(api: Arc<dyn RestApi>) -> Self {
        Self { api }
    }

    /// 全部评估（管理员）
    pub async fn list_all(&self) -> AppResult<Vec<Evaluation>> {
        let endpoint = "evaluaciones";
        decode_list(endpoint, self.api.get(endpoint).await?)
    }

    /// 协调员拥有的评估
    pub async fn list_for_coordinator(&self, coordinator: CoordinatorId) -> AppResult<Vec<Evaluation>> {
        let endpoint = format!("coordinadores/{}/evaluaciones", coordinator);
        decode_list(&endpoint, self.api.get(&endpoint).await?)
    }

    /// 评估员被分配到的评估
    pub async fn list_for_evaluator(&self, evaluator: EvaluatorId) -> AppResult<Vec<Evaluation>> {
        let endpoint = format!("evaluadores/{}/evaluaciones", evaluator);
        decode_list(&endpoint, self.api.get(&endpoint).await?)
    }

    pub async fn get(&self, id: EvaluationId) -> AppResult<Evaluation> {
        let endpoint = format!("evaluaciones/{}", id);
        decode(&endpoint, self.api.get(&endpoint).await?)
    }

    /// 创建评估
    pub async fn create(&self, evaluation: &NewEvaluation) -> AppResult<Evaluation> {
        evaluation.validate()?;
        let endpoint = "evaluaciones";
        let created: Evaluation =
            decode(endpoint, self.api.post(endpoint, &encode(endpoint, evaluation)?).await?)?;
        info!("✓ 评估已创建: {} ({})", created.name, created.code);
        Ok(created)
    }

    /// 修改评估配置
    pub async fn configure(&self, id: EvaluationId, config: &EvaluationConfig) -> AppResult<Evaluation> {
        let current = self.get(id).await?;
        if current.is_finished() {
            return Err(WorkflowError::EvaluationAlreadyFinished.into());
        }
        config.validate(&current)?;
        if config.is_empty() {
            return Ok(current);
        }

        let endpoint = format!("evaluaciones/{}", id);
        let updated = decode(&endpoint, self.api.put(&endpoint, &encode(&endpoint, config)?).await?)?;
        info!("✓ 评估 {} 配置已更新", id);
        Ok(updated)
    }

    /// 结束评估：结束日期设为今天
    pub async fn finalize(&self, id: EvaluationId) -> AppResult<Evaluation> {
        self.finalize_on(id, Local::now().date_naive()).await
    }

    pub async fn finalize_on(&self, id: EvaluationId, end_date: NaiveDate) -> AppResult<Evaluation> {
        let current = self.get(id).await?;
        if current.is_finished() {
            return Err(WorkflowError::EvaluationAlreadyFinished.into());
        }

        let endpoint = format!("evaluaciones/{}/finalizar", id);
        let body = json!({ "fechaFin": end_date });
        let finished = decode(&endpoint, self.api.put(&endpoint, &body).await?)?;
        info!("✓ 评估 {} 已结束 ({})", id, end_date);
        Ok(finished)
    }

    /// 删除评估（后端级联删除问题和分配）
    pub async fn delete(&self, id: EvaluationId) -> AppResult<()> {
        let endpoint = format!("evaluaciones/{}", id);
        self.api.delete(&endpoint).await?;
        info!("✓ 评估 {} 已删除", id);
        Ok(())
    }
}
