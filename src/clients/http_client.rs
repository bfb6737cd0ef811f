//! 后端 REST API 客户端
//!
//! 封装基础地址、Bearer token 和状态码到错误的映射；不做重试

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::clients::transport::{RestApi, UploadFile};
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, ConfigError};

/// REST API 客户端
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// 创建未认证的客户端（用于登录）
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("heuristic-eval/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::ClientBuildFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            token: None,
        })
    }

    /// 附加 Bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(path))
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, path: &str, builder: RequestBuilder) -> AppResult<JsonValue> {
        let response = builder
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(path, e))?;
        handle_response(path, response).await
    }
}

#[async_trait]
impl RestApi for HttpClient {
    async fn get(&self, path: &str) -> AppResult<JsonValue> {
        debug!("GET {}", path);
        self.send(path, self.request(Method::GET, path)).await
    }

    async fn post(&self, path: &str, body: &JsonValue) -> AppResult<JsonValue> {
        debug!("POST {} Payload: {}", path, body);
        self.send(path, self.request(Method::POST, path).json(body))
            .await
    }

    async fn put(&self, path: &str, body: &JsonValue) -> AppResult<JsonValue> {
        debug!("PUT {} Payload: {}", path, body);
        self.send(path, self.request(Method::PUT, path).json(body))
            .await
    }

    async fn delete(&self, path: &str) -> AppResult<JsonValue> {
        debug!("DELETE {}", path);
        self.send(path, self.request(Method::DELETE, path)).await
    }

    async fn upload(&self, path: &str, file: UploadFile) -> AppResult<JsonValue> {
        debug!(
            "UPLOAD {} 文件: {} ({} 字节)",
            path,
            file.file_name,
            file.bytes.len()
        );

        let part = multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.mime_type)
            .map_err(|e| AppError::api_request_failed(path, e))?;
        let form = multipart::Form::new().part("imagen", part);

        self.send(path, self.request(Method::POST, path).multipart(form))
            .await
    }
}

/// 把 HTTP 响应转换为 JSON 或结构化错误
async fn handle_response(endpoint: &str, response: Response) -> AppResult<JsonValue> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| AppError::api_request_failed(endpoint, e))?;

    if status.is_success() {
        if text.trim().is_empty() {
            return Ok(JsonValue::Null);
        }
        // 部分端点（删除、进度）只返回纯文本确认
        return Ok(serde_json::from_str(&text).unwrap_or_else(|_| {
            debug!("{} 返回非 JSON 响应: {}", endpoint, text);
            JsonValue::String(text)
        }));
    }

    warn!("API 返回错误 ({}): {} {}", endpoint, status, text);
    Err(status_error(endpoint, status, &text).into())
}

/// 根据状态码分类错误
pub(crate) fn status_error(endpoint: &str, status: StatusCode, body: &str) -> ApiError {
    let endpoint = endpoint.to_string();
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized { endpoint },
        StatusCode::FORBIDDEN => ApiError::Forbidden { endpoint },
        StatusCode::NOT_FOUND => ApiError::NotFound { endpoint },
        s if s.is_server_error() => ApiError::Server {
            endpoint,
            status: s.as_u16(),
            message: extract_message(body),
        },
        s => ApiError::Rejected {
            endpoint,
            status: s.as_u16(),
            message: extract_message(body),
        },
    }
}

/// 从错误响应体中提取提示信息
pub(crate) fn extract_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<JsonValue>(body) {
        for key in ["message", "mensaje", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.trim().to_string()
}
