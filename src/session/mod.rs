//! 会话上下文
//!
//! 登录后得到的 JWT、角色和当前选中的评估都放在显式的 `Session` 里，
//! 通过参数传给服务和流程，而不是到处读取本地存储

pub mod claims;
pub mod store;

pub use claims::Claims;
pub use store::SessionStore;

use chrono::Utc;

use crate::error::{AppResult, AuthError};
use crate::models::{CoordinatorId, EvaluationId, EvaluatorId, Role};

/// 已登录用户的会话
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub claims: Claims,
    /// 当前正在操作的评估
    pub current_evaluation: Option<EvaluationId>,
}

impl Session {
    /// 由登录成功的 token 建立会话
    ///
    /// `role` 以接受登录的端点为准，而不是 token 里的自述
    pub fn from_token(token: impl Into<String>, role: Role) -> Result<Self, AuthError> {
        let token = token.into();
        let claims = Claims::decode(&token)?;
        if claims.is_expired(Utc::now()) {
            return Err(AuthError::TokenExpired);
        }
        Ok(Self {
            token,
            role,
            claims,
            current_evaluation: None,
        })
    }

    pub fn user_id(&self) -> i64 {
        self.claims.id
    }

    pub fn display_name(&self) -> &str {
        self.claims.name.as_deref().unwrap_or(&self.claims.email)
    }

    /// 检查当前角色是否在允许列表中
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AuthError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AuthError::RoleNotPermitted {
                required: allowed
                    .iter()
                    .map(|r| r.name())
                    .collect::<Vec<_>>()
                    .join("/"),
                actual: self.role.name().to_string(),
            })
        }
    }

    /// 当前用户作为评估员的 ID
    pub fn evaluator_id(&self) -> AppResult<EvaluatorId> {
        self.require_role(&[Role::Evaluator])?;
        Ok(EvaluatorId(self.user_id()))
    }

    /// 当前用户作为协调员的 ID
    pub fn coordinator_id(&self) -> AppResult<CoordinatorId> {
        self.require_role(&[Role::Coordinator])?;
        Ok(CoordinatorId(self.user_id()))
    }

    pub fn with_evaluation(mut self, evaluation: EvaluationId) -> Self {
        self.current_evaluation = Some(evaluation);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::claims::tests::make_token;
    use serde_json::json;

    #[test]
    fn test_role_guard() {
        let token = make_token(json!({ "id": 4, "correo": "eva@uni.edu" }));
        let session = Session::from_token(token, Role::Evaluator).unwrap();

        assert_eq!(session.evaluator_id().unwrap(), EvaluatorId(4));
        assert!(session.coordinator_id().is_err());
        assert!(session
            .require_role(&[Role::Coordinator, Role::Administrator])
            .is_err());
        assert_eq!(session.display_name(), "eva@uni.edu");
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = make_token(json!({ "id": 4, "exp": 10 }));
        assert!(matches!(
            Session::from_token(token, Role::Evaluator),
            Err(AuthError::TokenExpired)
        ));
    }
}
