//! # Heuristic Eval
//!
//! 启发式评估协调客户端：协调员创建评估并分配评估员，
//! 评估员按四个步骤登记、合并、评分问题，最后生成汇总报告
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 持有 HTTP 连接，只暴露 REST 能力
//! - `RestApi` - 传输层 trait（GET / POST / PUT / DELETE / 上传）
//! - `HttpClient` - 基于 reqwest 的实现，附加 base URL 和 Bearer 令牌
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 每个方法对应一个端点，只做请求构造和响应解析
//! - 发请求前的客户端规则也在这一层：评估员上限、移除保护、上传校验
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 进度状态机、问题合并、带截图的问题登记、级联删除
//! - `scoring/` - 平均分、危急度分级、最终汇总（纯数据变换）
//!
//! ### ④ 编排层（Orchestration）
//! - `cli` / `app` - 命令分发、会话生命周期、输出渲染
//!
//! ## 模块结构

pub mod app;
pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod scoring;
pub mod services;
pub mod session;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{HttpClient, RestApi};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use scoring::{CriticalityTier, FinalSummary};
pub use session::{Session, SessionStore};
pub use workflow::{ProgressFlow, ProgressTracker};
