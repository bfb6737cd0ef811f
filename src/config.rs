use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{AppResult, ConfigError};

/// 单张证据图片的默认上限（5MB）
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 后端 REST API 基础地址
    pub api_base_url: String,
    /// 持久化 JWT 的会话文件
    pub session_file: PathBuf,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 每个评估允许的最大评估员数量
    pub max_evaluators_per_evaluation: usize,
    /// 证据图片大小上限（字节）
    pub max_upload_bytes: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            session_file: PathBuf::from(".heuristic-eval/session.toml"),
            request_timeout_secs: 30,
            max_evaluators_per_evaluation: 5,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 读取 `HEURISTIC_EVAL_CONFIG` 指定的 TOML 文件（若有），再叠加环境变量
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("HEURISTIC_EVAL_CONFIG") {
            Ok(path) => {
                info!("加载配置文件: {}", path);
                Self::from_toml_file(Path::new(&path))?
            }
            Err(_) => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 只使用默认值和环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，缺失字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| {
            ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            }
            .into()
        })
    }

    fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(content)?;
        config.api_base_url = normalize_base_url(&config.api_base_url);
        Ok(config)
    }

    fn with_env_overrides(self) -> Self {
        Self {
            api_base_url: normalize_base_url(
                &std::env::var("API_BASE_URL").unwrap_or(self.api_base_url),
            ),
            session_file: std::env::var("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(self.session_file),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", self.request_timeout_secs),
            max_evaluators_per_evaluation: env_or(
                "MAX_EVALUATORS",
                self.max_evaluators_per_evaluation,
            ),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", self.max_upload_bytes),
            verbose_logging: env_or("VERBOSE_LOGGING", self.verbose_logging),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("环境变量 {} 的值 '{}' 无法解析，使用默认值", key, raw);
            default
        }),
        Err(_) => default,
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_evaluators_per_evaluation, 5);
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_toml_partial_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            api_base_url = "https://evaluaciones.example.org/api/"
            verbose_logging = true
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "https://evaluaciones.example.org/api");
        assert!(config.verbose_logging);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_toml_file_missing() {
        let result = Config::from_toml_file(Path::new("/definitely/not/here.toml"));
        assert!(result.is_err());
    }
}
