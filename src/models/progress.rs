use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::models::ids::{EvaluationId, EvaluatorId};

/// 评估员在某个评估中的步骤（1-4）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    /// 1. 发现问题
    FindingProblems = 1,
    /// 2. 合并问题
    Consolidation = 2,
    /// 3. 评分
    Scoring = 3,
    /// 4. 最终汇总
    FinalSummary = 4,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::FindingProblems,
        Step::Consolidation,
        Step::Scoring,
        Step::FinalSummary,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            1 => Some(Step::FindingProblems),
            2 => Some(Step::Consolidation),
            3 => Some(Step::Scoring),
            4 => Some(Step::FinalSummary),
            _ => None,
        }
    }

    /// 下一步；最后一步返回 None
    pub fn next(self) -> Option<Self> {
        Self::from_number(i64::from(self.number()) + 1)
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::FindingProblems => "Búsqueda de problemas",
            Step::Consolidation => "Consolidación",
            Step::Scoring => "Evaluación de problemas",
            Step::FinalSummary => "Resumen final",
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Step::FindingProblems
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.label())
    }
}

impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let n = i64::deserialize(deserializer)?;
        Step::from_number(n).ok_or_else(|| serde::de::Error::custom(format!("步骤 {} 超出范围 [1, 4]", n)))
    }
}

/// 后端保存的进度记录
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Progress {
    #[serde(rename = "evaluacionId")]
    pub evaluation_id: EvaluationId,
    #[serde(rename = "evaluadorId")]
    pub evaluator_id: EvaluatorId,
    #[serde(rename = "paso")]
    pub step: Step,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order_and_next() {
        assert!(Step::FindingProblems < Step::FinalSummary);
        assert_eq!(Step::Consolidation.next(), Some(Step::Scoring));
        assert_eq!(Step::FinalSummary.next(), None);
    }

    #[test]
    fn test_step_serde_as_integer() {
        assert_eq!(serde_json::to_string(&Step::Scoring).unwrap(), "3");
        assert!(serde_json::from_str::<Step>("0").is_err());
    }
}
