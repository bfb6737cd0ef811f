use thiserror::Error;

use crate::models::Step;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 认证/会话权限错误
    #[error("认证错误: {0}")]
    Auth(#[from] AuthError),
    /// 发起请求前的客户端校验失败
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 流程（步骤、合并、删除）错误
    #[error("流程错误: {0}")]
    Workflow(#[from] WorkflowError),
    /// 本地会话文件错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),
    /// 其他错误
    #[error("错误: {0}")]
    Other(String),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 401
    #[error("未授权 ({endpoint})")]
    Unauthorized { endpoint: String },
    /// 403
    #[error("禁止访问 ({endpoint})")]
    Forbidden { endpoint: String },
    /// 404
    #[error("资源不存在 ({endpoint})")]
    NotFound { endpoint: String },
    /// 其他 4xx
    #[error("请求被拒绝 ({endpoint}): status={status}, message={message}")]
    Rejected {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// 5xx
    #[error("服务端错误 ({endpoint}): status={status}, message={message}")]
    Server {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// API 返回空结果
    #[error("API返回空结果: {endpoint}")]
    EmptyResponse { endpoint: String },
}

/// 认证错误
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("邮箱或密码错误")]
    InvalidCredentials,
    #[error("尚未登录")]
    NotLoggedIn,
    #[error("令牌格式错误: {0}")]
    TokenMalformed(String),
    #[error("令牌已过期")]
    TokenExpired,
    #[error("当前角色 {actual} 无权执行该操作 (需要: {required})")]
    RoleNotPermitted { required: String, actual: String },
    #[error("只能修改自己登记的问题 (问题 {0})")]
    NotProblemOwner(i64),
}

/// 客户端校验错误
///
/// 这些错误都在网络请求之前产生
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("每个评估最多 {limit} 名评估员")]
    EvaluatorLimitReached { limit: usize },
    #[error("该评估员已分配到此评估")]
    EvaluatorAlreadyAssigned,
    #[error("该评估员已登记 {count} 个问题，无法移除")]
    EvaluatorHasProblems { count: usize },
    #[error("不支持的图片类型: {extension} (仅支持 jpg/jpeg/png)")]
    UnsupportedImageType { extension: String },
    #[error("图片过大: {size} 字节 (上限 {limit} 字节)")]
    ImageTooLarge { size: u64, limit: u64 },
    #[error("{field} 取值 {value} 超出范围 [0, 4]")]
    ScoreOutOfRange { field: &'static str, value: i64 },
    #[error("启发式原则编号 {0} 超出范围 [1, 10]")]
    HeuristicOutOfRange(i64),
    #[error("字段不能为空: {0}")]
    EmptyField(&'static str),
    #[error("邮箱格式不正确: {0}")]
    InvalidEmail(String),
    #[error("结束日期早于开始日期")]
    InvalidDateRange,
}

/// 流程错误
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("从步骤 {from} 进入步骤 {to} 需要确认")]
    ConfirmationRequired { from: Step, to: Step },
    #[error("步骤 {step} 尚未完成: 还有 {pending} 个问题待评分")]
    StepIncomplete { step: Step, pending: usize },
    #[error("已处于最后一步")]
    AlreadyFinalStep,
    #[error("进度不能回退: 当前 {current}, 请求 {requested}")]
    StepRegression { current: Step, requested: Step },
    #[error("合并至少需要两个问题")]
    ConsolidationNeedsTwoProblems,
    #[error("只能合并同一评估中的问题")]
    ConsolidationAcrossEvaluations,
    #[error("评估已结束")]
    EvaluationAlreadyFinished,
    #[error("删除将级联移除 {problems} 个问题和 {evaluators} 个评估员分配，需要确认")]
    CascadeNotConfirmed { problems: usize, evaluators: usize },
    #[error("尚未选择评估，请使用 --evaluation 或先执行 use")]
    NoEvaluationSelected,
    #[error("需要先到达步骤 {required}，当前在步骤 {current}")]
    StepLocked { required: Step, current: Step },
}

/// 本地会话文件错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("读取会话文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入会话文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("会话文件解析失败 ({path}): {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("会话序列化失败: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("HTTP 客户端构建失败: {0}")]
    ClientBuildFailed(String),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 是否为认证类失败（登录级联据此决定是否尝试下一个角色）
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AppError::Api(
                ApiError::Unauthorized { .. }
                    | ApiError::Forbidden { .. }
                    | ApiError::NotFound { .. }
                    | ApiError::Rejected { .. }
            ) | AppError::Auth(AuthError::InvalidCredentials)
        )
    }

    /// 给终端用户看的一行提示
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api(ApiError::Unauthorized { .. }) | AppError::Auth(AuthError::TokenExpired) => {
                "会话已失效，请重新登录".to_string()
            }
            AppError::Api(ApiError::RequestFailed { .. }) => {
                "无法连接到服务器，请稍后重试".to_string()
            }
            AppError::Api(ApiError::Rejected { message, .. })
            | AppError::Api(ApiError::Server { message, .. })
                if !message.is_empty() =>
            {
                message.clone()
            }
            AppError::Validation(e) => e.to_string(),
            AppError::Workflow(e) => e.to_string(),
            AppError::Auth(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
