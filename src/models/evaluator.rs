use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::ids::{CoordinatorId, EvaluationId, EvaluatorId};

/// 评估员
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluator {
    pub id: EvaluatorId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellido", default)]
    pub last_name: String,
    #[serde(rename = "correo")]
    pub email: String,
}

impl Evaluator {
    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.last_name)
        }
    }
}

/// 创建评估员账户（也用于协调员账户）
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "contrasena")]
    pub password: String,
}

impl NewAccount {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("nombre"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::EmptyField("contrasena"));
        }
        validate_email(&self.email)
    }
}

/// 协调员
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coordinator {
    pub id: CoordinatorId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellido", default)]
    pub last_name: String,
    #[serde(rename = "correo")]
    pub email: String,
}

/// 评估与评估员之间的分配关系
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignment {
    #[serde(rename = "evaluacionId")]
    pub evaluation_id: EvaluationId,
    #[serde(rename = "evaluadorId")]
    pub evaluator_id: EvaluatorId,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    })
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email_regex().is_match(email.trim()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}
