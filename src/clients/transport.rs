//! REST 传输接口
//!
//! 服务层只依赖这个 trait，真实实现是 `HttpClient`，测试中使用内存替身

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::{ApiError, AppResult};

/// 待上传的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// REST 后端能力
///
/// 路径相对于配置中的 API 基础地址，例如 `"evaluaciones/3/problemas"`
#[async_trait]
pub trait RestApi: Send + Sync {
    async fn get(&self, path: &str) -> AppResult<JsonValue>;

    async fn post(&self, path: &str, body: &JsonValue) -> AppResult<JsonValue>;

    async fn put(&self, path: &str, body: &JsonValue) -> AppResult<JsonValue>;

    async fn delete(&self, path: &str) -> AppResult<JsonValue>;

    /// multipart 上传，文件字段名为 `imagen`
    async fn upload(&self, path: &str, file: UploadFile) -> AppResult<JsonValue>;
}

/// 把 JSON 响应解析为类型化模型
pub fn decode<T: DeserializeOwned>(endpoint: &str, value: JsonValue) -> AppResult<T> {
    if value.is_null() {
        return Err(ApiError::EmptyResponse {
            endpoint: endpoint.to_string(),
        }
        .into());
    }
    serde_json::from_value(value).map_err(|source| {
        ApiError::JsonParseFailed {
            endpoint: endpoint.to_string(),
            source,
        }
        .into()
    })
}

/// 把列表响应解析为 `Vec<T>`；空响应视为空列表
pub fn decode_list<T: DeserializeOwned>(endpoint: &str, value: JsonValue) -> AppResult<Vec<T>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    decode(endpoint, value)
}

/// 把请求体序列化为 JSON
pub fn encode<T: serde::Serialize>(endpoint: &str, body: &T) -> AppResult<JsonValue> {
    serde_json::to_value(body).map_err(|source| {
        ApiError::JsonParseFailed {
            endpoint: endpoint.to_string(),
            source,
        }
        .into()
    })
}
