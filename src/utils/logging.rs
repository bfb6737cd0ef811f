/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use crate::config::Config;
use crate::session::Session;

/// 日志级别句柄，配置加载完成后用于调整级别
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogHandle {
    /// 按配置切换 debug/info；设置了 `RUST_LOG` 时保持不变
    pub fn set_verbose(&self, verbose: bool) {
        if self.from_env {
            return;
        }
        let _ = self.filter.reload(EnvFilter::new(level(verbose)));
    }
}

fn level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug/info；日志写到 stderr，重复调用无副作用
pub fn init(verbose: bool) -> LogHandle {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(level(verbose)), false),
    };
    let (filter, handle) = reload::Layer::new(filter);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();

    LogHandle {
        filter: handle,
        from_env,
    }
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 启发式评估客户端启动");
    info!("🌐 API: {}", config.api_base_url);
    info!("👥 每个评估最多评估员: {}", config.max_evaluators_per_evaluation);
    info!("{}", "=".repeat(60));
}

/// 记录当前会话
pub fn log_session(session: &Session) {
    info!(
        "👤 当前用户: {} ({}){}",
        session.display_name(),
        session.role,
        session
            .current_evaluation
            .map(|e| format!(" | 当前评估 {}", e))
            .unwrap_or_default()
    );
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
