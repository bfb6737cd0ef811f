use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppResult, SessionError};
use crate::models::{EvaluationId, Role};
use crate::session::Session;

/// 会话文件的持久化形态
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    current_evaluation: Option<EvaluationId>,
}

/// 会话文件存储（TOML）
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取会话
    ///
    /// 文件不存在返回 `None`；token 过期或损坏时删除文件并返回 `None`
    pub fn load(&self) -> AppResult<Option<Session>> {
        if !self.path.exists() {
            debug!("会话文件不存在: {}", self.path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            SessionError::ReadFailed {
                path: self.path.display().to_string(),
                source,
            }
        })?;

        let stored: StoredSession = match toml::from_str(&content) {
            Ok(stored) => stored,
            Err(source) => {
                warn!("会话文件无法解析，已清除: {}", source);
                self.clear()?;
                return Ok(None);
            }
        };

        match Session::from_token(stored.token, stored.role) {
            Ok(mut session) => {
                session.current_evaluation = stored.current_evaluation;
                Ok(Some(session))
            }
            Err(e) => {
                warn!("本地会话无效 ({})，已清除", e);
                self.clear()?;
                Ok(None)
            }
        }
    }

    /// 保存会话
    pub fn save(&self, session: &Session) -> AppResult<()> {
        let stored = StoredSession {
            token: session.token.clone(),
            role: session.role,
            current_evaluation: session.current_evaluation,
        };
        let content = toml::to_string(&stored).map_err(SessionError::from)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| SessionError::WriteFailed {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }

        std::fs::write(&self.path, content).map_err(|source| SessionError::WriteFailed {
            path: self.path.display().to_string(),
            source,
        })?;

        info!("会话已保存至: {}", self.path.display());
        Ok(())
    }

    /// 删除会话文件（登出）
    pub fn clear(&self) -> AppResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::WriteFailed {
                path: self.path.display().to_string(),
                source,
            }
            .into()),
        }
    }
}
