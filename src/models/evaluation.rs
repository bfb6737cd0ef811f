use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::ids::{CoordinatorId, EvaluationId};

/// 启发式评估
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    pub id: EvaluationId,
    /// 评估编码（例如 "HE-2024-03"）
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "fechaInicio")]
    pub start_date: NaiveDate,
    #[serde(rename = "fechaFin", default)]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "coordinadorId")]
    pub coordinator_id: CoordinatorId,
    /// 使用的启发式集合
    #[serde(rename = "heuristicaId", default)]
    pub heuristic_set: Option<i64>,
}

impl Evaluation {
    /// 是否已经结束（已设置结束日期）
    pub fn is_finished(&self) -> bool {
        self.end_date.is_some()
    }
}

/// 创建评估的表单
#[derive(Debug, Clone, Serialize)]
pub struct NewEvaluation {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "fechaInicio")]
    pub start_date: NaiveDate,
    #[serde(rename = "coordinadorId")]
    pub coordinator_id: CoordinatorId,
    #[serde(rename = "heuristicaId", skip_serializing_if = "Option::is_none")]
    pub heuristic_set: Option<i64>,
}

impl NewEvaluation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyField("codigo"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("nombre"));
        }
        Ok(())
    }
}

/// 评估"配置"编辑：只发送被修改的字段
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationConfig {
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "fechaInicio", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "heuristicaId", skip_serializing_if = "Option::is_none")]
    pub heuristic_set: Option<i64>,
}

impl EvaluationConfig {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.start_date.is_none()
            && self.heuristic_set.is_none()
    }

    pub fn validate(&self, current: &Evaluation) -> Result<(), ValidationError> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(ValidationError::EmptyField("nombre"));
        }
        if let (Some(start), Some(end)) = (self.start_date, current.end_date) {
            if end < start {
                return Err(ValidationError::InvalidDateRange);
            }
        }
        Ok(())
    }
}

/// 删除评估前展示给用户的级联影响
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionImpact {
    pub problems: usize,
    pub evaluators: usize,
}
