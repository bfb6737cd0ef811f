//! JWT 载荷解析
//!
//! 只在客户端解码 payload 段用于显示身份和判断过期，不校验签名（签名由后端负责）

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::models::Role;

/// JWT 载荷中客户端关心的字段
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub id: i64,
    #[serde(alias = "correo", default)]
    pub email: String,
    #[serde(alias = "nombre", default)]
    pub name: Option<String>,
    #[serde(alias = "rol", default)]
    pub role: Option<Role>,
    /// 过期时间（Unix 秒）
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// 解码 `header.payload.signature` 中的 payload
    pub fn decode(token: &str) -> Result<Self, AuthError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(AuthError::TokenMalformed(format!(
                "期望 3 段，实际 {} 段",
                segments.len()
            )));
        }

        // 部分后端会带 '=' 填充
        let payload = segments[1].trim_end_matches('=');
        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| AuthError::TokenMalformed(format!("base64: {}", e)))?;

        serde_json::from_slice(&bytes).map_err(|e| AuthError::TokenMalformed(format!("json: {}", e)))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.exp, Some(exp) if exp <= now.timestamp())
    }
}
