use phf::phf_map;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Nielsen 十项可用性启发式原则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Heuristic {
    /// 系统状态可见性
    VisibilityOfSystemStatus = 1,
    /// 系统与现实世界的匹配
    MatchWithRealWorld = 2,
    /// 用户控制与自由
    UserControlAndFreedom = 3,
    /// 一致性与标准
    ConsistencyAndStandards = 4,
    /// 错误预防
    ErrorPrevention = 5,
    /// 识别而非回忆
    RecognitionRatherThanRecall = 6,
    /// 使用的灵活性与效率
    FlexibilityAndEfficiency = 7,
    /// 美观与极简设计
    AestheticAndMinimalistDesign = 8,
    /// 帮助用户识别、诊断和恢复错误
    HelpUsersRecoverFromErrors = 9,
    /// 帮助与文档
    HelpAndDocumentation = 10,
}

/// 命令行/表单中可接受的原则别名
static ALIASES: phf::Map<&'static str, u8> = phf_map! {
    "visibilidad" => 1,
    "visibility" => 1,
    "mundo-real" => 2,
    "real-world" => 2,
    "control" => 3,
    "libertad" => 3,
    "consistencia" => 4,
    "consistency" => 4,
    "prevencion" => 5,
    "prevention" => 5,
    "reconocimiento" => 6,
    "recognition" => 6,
    "flexibilidad" => 7,
    "flexibility" => 7,
    "estetica" => 8,
    "minimalismo" => 8,
    "aesthetic" => 8,
    "errores" => 9,
    "recovery" => 9,
    "ayuda" => 10,
    "documentacion" => 10,
    "help" => 10,
};

impl Heuristic {
    pub const ALL: [Heuristic; 10] = [
        Heuristic::VisibilityOfSystemStatus,
        Heuristic::MatchWithRealWorld,
        Heuristic::UserControlAndFreedom,
        Heuristic::ConsistencyAndStandards,
        Heuristic::ErrorPrevention,
        Heuristic::RecognitionRatherThanRecall,
        Heuristic::FlexibilityAndEfficiency,
        Heuristic::AestheticAndMinimalistDesign,
        Heuristic::HelpUsersRecoverFromErrors,
        Heuristic::HelpAndDocumentation,
    ];

    /// 获取原则编号（1-10）
    pub fn code(self) -> u8 {
        self as u8
    }

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Heuristic::VisibilityOfSystemStatus => "Visibilidad del estado del sistema",
            Heuristic::MatchWithRealWorld => "Relación entre el sistema y el mundo real",
            Heuristic::UserControlAndFreedom => "Control y libertad del usuario",
            Heuristic::ConsistencyAndStandards => "Consistencia y estándares",
            Heuristic::ErrorPrevention => "Prevención de errores",
            Heuristic::RecognitionRatherThanRecall => "Reconocimiento antes que recuerdo",
            Heuristic::FlexibilityAndEfficiency => "Flexibilidad y eficiencia de uso",
            Heuristic::AestheticAndMinimalistDesign => "Estética y diseño minimalista",
            Heuristic::HelpUsersRecoverFromErrors => {
                "Ayudar a reconocer, diagnosticar y recuperarse de errores"
            }
            Heuristic::HelpAndDocumentation => "Ayuda y documentación",
        }
    }

    /// 从编号解析原则
    pub fn from_code(code: i64) -> Result<Self, ValidationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|h| i64::from(h.code()) == code)
            .ok_or(ValidationError::HeuristicOutOfRange(code))
    }

    /// 从编号或别名解析（不区分大小写）
    pub fn from_alias(s: &str) -> Result<Self, ValidationError> {
        let key = s.trim().to_lowercase();
        if let Ok(code) = key.parse::<i64>() {
            return Self::from_code(code);
        }
        match ALIASES.get(key.as_str()) {
            Some(code) => Self::from_code(i64::from(*code)),
            None => Err(ValidationError::HeuristicOutOfRange(0)),
        }
    }
}

impl std::fmt::Display for Heuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{} {}", self.code(), self.name())
    }
}

impl Serialize for Heuristic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Heuristic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        Heuristic::from_code(code).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for h in Heuristic::ALL {
            assert_eq!(Heuristic::from_code(i64::from(h.code())).unwrap(), h);
        }
        assert!(Heuristic::from_code(0).is_err());
        assert!(Heuristic::from_code(11).is_err());
    }

    #[test]
    fn test_alias_lookup() {
        assert_eq!(
            Heuristic::from_alias("Visibilidad").unwrap(),
            Heuristic::VisibilityOfSystemStatus
        );
        assert_eq!(
            Heuristic::from_alias("7").unwrap(),
            Heuristic::FlexibilityAndEfficiency
        );
        assert!(Heuristic::from_alias("colores").is_err());
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Heuristic>("12").is_err());
        assert_eq!(
            serde_json::from_str::<Heuristic>("5").unwrap(),
            Heuristic::ErrorPrevention
        );
    }
}
