//! 测试用的内存 REST 后端
//!
//! 按 (方法, 路径) 返回预设响应，并记录每一次调用

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value as JsonValue};

use heuristic_eval::clients::{RestApi, UploadFile};
use heuristic_eval::error::{ApiError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Upload,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<JsonValue>,
}

#[derive(Debug, Clone)]
enum Reply {
    Json(JsonValue),
    Status(u16),
}

#[derive(Default)]
pub struct MockApi {
    replies: Mutex<HashMap<(Method, String), Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 预设成功响应
    pub fn on(&self, method: Method, path: &str, value: JsonValue) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Reply::Json(value));
        self
    }

    /// 预设失败状态码
    pub fn fail(&self, method: Method, path: &str, status: u16) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Reply::Status(status));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }

    pub fn called(&self, method: Method, path: &str) -> bool {
        self.calls()
            .iter()
            .any(|c| c.method == method && c.path == path)
    }

    pub fn body_of(&self, method: Method, path: &str) -> Option<JsonValue> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .last()
            .and_then(|c| c.body)
    }

    fn respond(&self, method: Method, path: &str, body: Option<JsonValue>) -> AppResult<JsonValue> {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            body,
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&(method, path.to_string()))
            .cloned()
            .unwrap_or(Reply::Status(404));

        let endpoint = path.to_string();
        match reply {
            Reply::Json(value) => Ok(value),
            Reply::Status(401) => Err(ApiError::Unauthorized { endpoint }.into()),
            Reply::Status(403) => Err(ApiError::Forbidden { endpoint }.into()),
            Reply::Status(404) => Err(ApiError::NotFound { endpoint }.into()),
            Reply::Status(status) if status < 500 => Err(ApiError::Rejected {
                endpoint,
                status,
                message: "rechazado".to_string(),
            }
            .into()),
            Reply::Status(status) => Err(ApiError::Server {
                endpoint,
                status,
                message: "error interno".to_string(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl RestApi for MockApi {
    async fn get(&self, path: &str) -> AppResult<JsonValue> {
        self.respond(Method::Get, path, None)
    }

    async fn post(&self, path: &str, body: &JsonValue) -> AppResult<JsonValue> {
        self.respond(Method::Post, path, Some(body.clone()))
    }

    async fn put(&self, path: &str, body: &JsonValue) -> AppResult<JsonValue> {
        self.respond(Method::Put, path, Some(body.clone()))
    }

    async fn delete(&self, path: &str) -> AppResult<JsonValue> {
        self.respond(Method::Delete, path, None)
    }

    async fn upload(&self, path: &str, file: UploadFile) -> AppResult<JsonValue> {
        let body = json!({ "archivo": file.file_name, "tipo": file.mime_type });
        self.respond(Method::Upload, path, Some(body))
    }
}

/// 转成服务需要的 trait 对象
pub fn as_api(mock: &Arc<MockApi>) -> Arc<dyn RestApi> {
    mock.clone()
}

/// 未签名的测试令牌
pub fn make_token(payload: JsonValue) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.firma", header, body)
}

// ========== 测试数据 ==========

pub fn evaluator_json(id: i64) -> JsonValue {
    json!({
        "id": id,
        "nombre": format!("Evaluador {}", id),
        "apellido": "Pérez",
        "correo": format!("evaluador{}@uni.edu", id),
    })
}

pub fn problem_json(id: i64, number: u32, evaluator: i64, evaluation: i64) -> JsonValue {
    json!({
        "id": id,
        "numero": number,
        "titulo": format!("Problema {}", number),
        "descripcion": "El botón no responde",
        "principio": 1,
        "ejemplo": "Pantalla de inicio",
        "imagen": null,
        "evaluadorId": evaluator,
        "evaluacionId": evaluation,
    })
}

pub fn evaluation_json(id: i64, finished: bool) -> JsonValue {
    json!({
        "id": id,
        "codigo": format!("HE-{}", id),
        "nombre": "Portal de alumnos",
        "descripcion": "Evaluación del portal",
        "fechaInicio": "2024-03-01",
        "fechaFin": if finished { json!("2024-04-01") } else { JsonValue::Null },
        "coordinadorId": 7,
    })
}

pub fn score_json(problem: i64, evaluator: i64, frequency: u8, severity: u8) -> JsonValue {
    json!({
        "problemaId": problem,
        "evaluadorId": evaluator,
        "frecuencia": frequency,
        "severidad": severity,
        "criticidad": frequency + severity,
    })
}
