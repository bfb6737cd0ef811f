use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::heuristic::Heuristic;
use crate::models::ids::{EvaluationId, EvaluatorId, ProblemId};

/// 可用性问题
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Problem {
    pub id: ProblemId,
    /// 评估内的序号
    #[serde(rename = "numero")]
    pub number: u32,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    /// 违反的启发式原则
    #[serde(rename = "principio")]
    pub heuristic: Heuristic,
    /// 出现场景示例
    #[serde(rename = "ejemplo", default)]
    pub example: String,
    /// 证据图片路径
    #[serde(rename = "imagen", default)]
    pub image: Option<String>,
    #[serde(rename = "evaluadorId")]
    pub evaluator_id: EvaluatorId,
    #[serde(rename = "evaluacionId")]
    pub evaluation_id: EvaluationId,
    /// 合并而来的原始问题
    #[serde(rename = "origenes", default, skip_serializing_if = "Vec::is_empty")]
    pub origins: Vec<ProblemId>,
}

impl Problem {
    pub fn is_consolidated(&self) -> bool {
        !self.origins.is_empty()
    }
}

/// 新建问题
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewProblem {
    #[serde(rename = "numero")]
    pub number: u32,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "principio")]
    pub heuristic: Heuristic,
    #[serde(rename = "ejemplo")]
    pub example: String,
    #[serde(rename = "imagen", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "evaluadorId")]
    pub evaluator_id: EvaluatorId,
    #[serde(rename = "evaluacionId")]
    pub evaluation_id: EvaluationId,
    #[serde(rename = "origenes", skip_serializing_if = "Vec::is_empty")]
    pub origins: Vec<ProblemId>,
}

/// 用户填写的问题内容（序号、作者由服务层补全）
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemDraft {
    pub title: String,
    pub description: String,
    pub heuristic: Heuristic,
    pub example: String,
    pub image: Option<String>,
}

impl ProblemDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyField("titulo"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyField("descripcion"));
        }
        Ok(())
    }
}

/// 问题编辑：只包含被修改的字段
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProblemUpdate {
    #[serde(rename = "titulo", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "principio", skip_serializing_if = "Option::is_none")]
    pub heuristic: Option<Heuristic>,
    #[serde(rename = "ejemplo", skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(rename = "imagen", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ProblemUpdate {
    /// 与当前记录比较，列出真正发生变化的字段
    pub fn diff(&self, current: &Problem) -> Vec<FieldChange> {
        let mut changes = Vec::new();
        push_change(&mut changes, "titulo", &current.title, self.title.as_ref());
        push_change(
            &mut changes,
            "descripcion",
            &current.description,
            self.description.as_ref(),
        );
        if let Some(heuristic) = self.heuristic {
            if heuristic != current.heuristic {
                changes.push(FieldChange {
                    field: "principio".to_string(),
                    before: current.heuristic.code().to_string(),
                    after: heuristic.code().to_string(),
                });
            }
        }
        push_change(&mut changes, "ejemplo", &current.example, self.example.as_ref());
        let current_image = current.image.clone().unwrap_or_default();
        push_change(&mut changes, "imagen", &current_image, self.image.as_ref());
        changes
    }
}

fn push_change(changes: &mut Vec<FieldChange>, field: &str, before: &str, after: Option<&String>) {
    if let Some(after) = after {
        if after != before {
            changes.push(FieldChange {
                field: field.to_string(),
                before: before.to_string(),
                after: after.clone(),
            });
        }
    }
}

/// 单个字段的修改
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldChange {
    #[serde(rename = "campo")]
    pub field: String,
    #[serde(rename = "anterior")]
    pub before: String,
    #[serde(rename = "nuevo")]
    pub after: String,
}

/// 问题修改历史
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeLogEntry {
    #[serde(rename = "problemaId")]
    pub problem_id: ProblemId,
    #[serde(rename = "evaluadorId")]
    pub evaluator_id: EvaluatorId,
    #[serde(rename = "fecha")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "cambios")]
    pub changes: Vec<FieldChange>,
}

/// 下一个可用的序号（当前最大值 + 1）
pub fn next_problem_number(existing: &[Problem]) -> u32 {
    existing.iter().map(|p| p.number).max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(number: u32) -> Problem {
        Problem {
            id: ProblemId(i64::from(number) * 10),
            number,
            title: "Botón sin retroalimentación".to_string(),
            description: "Al guardar no se indica el resultado".to_string(),
            heuristic: Heuristic::VisibilityOfSystemStatus,
            example: "Formulario de perfil".to_string(),
            image: None,
            evaluator_id: EvaluatorId(1),
            evaluation_id: EvaluationId(1),
            origins: Vec::new(),
        }
    }

    #[test]
    fn test_next_number() {
        assert_eq!(next_problem_number(&[]), 1);
        assert_eq!(next_problem_number(&[problem(1), problem(4), problem(2)]), 5);
    }

    #[test]
    fn test_diff_only_reports_real_changes() {
        let current = problem(1);
        let update = ProblemUpdate {
            title: Some(current.title.clone()),
            heuristic: Some(Heuristic::ErrorPrevention),
            image: Some("uploads/evidencia.png".to_string()),
            ..Default::default()
        };

        let changes = update.diff(&current);
        let fields: Vec<&str> = changes.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["principio", "imagen"]);
        assert_eq!(changes[0].before, "1");
        assert_eq!(changes[0].after, "5");
    }
}
