use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;
use crate::models::ids::{EvaluatorId, ProblemId};

/// 频率/严重度分值，取值 0..=4
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct ScoreValue(u8);

impl ScoreValue {
    pub const MAX: u8 = 4;

    pub fn new(field: &'static str, value: i64) -> Result<Self, ValidationError> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::ScoreOutOfRange { field, value })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl<'de> Deserialize<'de> for ScoreValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        ScoreValue::new("puntuacion", value).map_err(serde::de::Error::custom)
    }
}

/// 某评估员对某问题的评分
///
/// `(0, 0)` 既表示"尚未评分"，也可能是真实的两个零分，两者无法区分
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Score {
    #[serde(rename = "problemaId")]
    pub problem_id: ProblemId,
    #[serde(rename = "evaluadorId")]
    pub evaluator_id: EvaluatorId,
    #[serde(rename = "frecuencia", default)]
    pub frequency: ScoreValue,
    #[serde(rename = "severidad", default)]
    pub severity: ScoreValue,
    /// 由后端给出的危急度，客户端不自行计算
    #[serde(rename = "criticidad", default)]
    pub criticality: f64,
}

impl Score {
    /// 是否为未触碰的 (0, 0)
    pub fn is_untouched(&self) -> bool {
        self.frequency.get() == 0 && self.severity.get() == 0
    }
}

/// 提交评分的请求体
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreInput {
    #[serde(rename = "frecuencia")]
    pub frequency: ScoreValue,
    #[serde(rename = "severidad")]
    pub severity: ScoreValue,
}

impl ScoreInput {
    pub fn new(frequency: i64, severity: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            frequency: ScoreValue::new("frecuencia", frequency)?,
            severity: ScoreValue::new("severidad", severity)?,
        })
    }
}
