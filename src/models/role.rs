use serde::{Deserialize, Serialize};
use std::fmt;

/// 用户角色
///
/// 每个角色对应后端的一个账户集合，登录时按 `LOGIN_ORDER` 依次尝试
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "evaluador")]
    Evaluator,
    #[serde(alias = "coordinador")]
    Coordinator,
    #[serde(alias = "administrador")]
    Administrator,
}

impl Role {
    /// 登录尝试顺序
    pub const LOGIN_ORDER: [Role; 3] = [Role::Evaluator, Role::Coordinator, Role::Administrator];

    /// 对应的 REST 集合
    pub fn collection(self) -> &'static str {
        match self {
            Role::Evaluator => "evaluadores",
            Role::Coordinator => "coordinadores",
            Role::Administrator => "administradores",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Evaluator => "evaluador",
            Role::Coordinator => "coordinador",
            Role::Administrator => "administrador",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
