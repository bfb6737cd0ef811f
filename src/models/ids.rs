//! 后端实体的类型化 ID
//!
//! 全部是 `i64` 的透明包装，序列化时与后端的数字 ID 一致

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// 评估 ID
    EvaluationId
);
entity_id!(
    /// 问题 ID
    ProblemId
);
entity_id!(
    /// 评估员 ID
    EvaluatorId
);
entity_id!(
    /// 协调员 ID
    CoordinatorId
);
