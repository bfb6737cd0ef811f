use serde::Serialize;
use std::fmt;

/// 分值颜色档位
///
/// 所有展示频率、严重度、危急度的地方都通过 `tier` 取档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CriticalityTier {
    /// 0：未评分/无问题
    None,
    /// (0, 2]
    Low,
    /// (2, 3]
    Medium,
    /// > 3
    High,
}

/// 阈值 0 / ≤2 / =3 / >3 映射到四档
///
/// 平均值可能是小数，(2, 3] 区间归入 `Medium`
pub fn tier(value: f64) -> CriticalityTier {
    if value <= 0.0 || value.is_nan() {
        CriticalityTier::None
    } else if value <= 2.0 {
        CriticalityTier::Low
    } else if value <= 3.0 {
        CriticalityTier::Medium
    } else {
        CriticalityTier::High
    }
}

impl CriticalityTier {
    /// 四档调色板
    pub fn color(self) -> &'static str {
        match self {
            CriticalityTier::None => "#E0E0E0",
            CriticalityTier::Low => "#81C784",
            CriticalityTier::Medium => "#FFB74D",
            CriticalityTier::High => "#E57373",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CriticalityTier::None => "sin valorar",
            CriticalityTier::Low => "baja",
            CriticalityTier::Medium => "media",
            CriticalityTier::High => "alta",
        }
    }
}

impl fmt::Display for CriticalityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
