//! 登录服务 - 业务能力层
//!
//! 依次向评估员、协调员、管理员三个登录端点尝试同一组凭据

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::clients::{decode, RestApi};
use crate::error::{AppResult, AuthError};
use crate::models::Role;
use crate::session::Session;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// 登录服务
pub struct AuthService {
    api: Arc<dyn RestApi>,
}

impl AuthService {
    pub fn new(api: Arc<dyn RestApi>) -> Self {
        Self { api }
    }

    /// 登录
    ///
    /// 某个角色端点返回认证类错误时继续尝试下一个角色；
    /// 网络或服务端错误直接返回。三次都失败返回 `InvalidCredentials`
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let body = json!({
            "correo": email.trim(),
            "contrasena": password,
        });

        for role in Role::LOGIN_ORDER {
            let endpoint = format!("{}/login", role.collection());
            debug!("尝试以 {} 身份登录", role);

            match self.api.post(&endpoint, &body).await {
                Ok(value) => {
                    let response: LoginResponse = decode(&endpoint, value)?;
                    let session = Session::from_token(response.token, role)?;
                    info!("✓ 登录成功: {} ({})", session.display_name(), role);
                    return Ok(session);
                }
                Err(e) if e.is_auth_failure() => {
                    debug!("{} 登录失败: {}", role, e);
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AuthError::InvalidCredentials.into())
    }
}
