//! 命令行定义
//!
//! 每个子命令对应一个页面：取数据、校验、调用服务、打印结果

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::models::Heuristic;
use crate::utils::ListQuery;

#[derive(Parser, Debug)]
#[command(name = "heuristic-eval")]
#[command(about = "启发式评估协调客户端", long_about = None)]
pub struct Cli {
    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 登录（依次尝试 评估员 / 协调员 / 管理员）
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// 退出登录并删除本地会话
    Logout,
    /// 显示当前用户
    Whoami,
    /// 选择当前操作的评估
    Use { evaluation: i64 },
    /// 评估管理
    #[command(subcommand)]
    Evaluations(EvaluationCommand),
    /// 评估员管理
    #[command(subcommand)]
    Evaluators(EvaluatorCommand),
    /// 协调员管理（管理员）
    #[command(subcommand)]
    Coordinators(CoordinatorCommand),
    /// 问题登记（步骤 1）
    #[command(subcommand)]
    Problems(ProblemCommand),
    /// 合并多个问题（步骤 2）
    Consolidate {
        #[command(flatten)]
        scope: EvaluationScope,
        /// 要合并的问题 ID
        #[arg(long = "problem", required = true, num_args = 2..)]
        problems: Vec<i64>,
        #[command(flatten)]
        content: ProblemContent,
    },
    /// 评分（步骤 3）
    Score {
        #[command(flatten)]
        scope: EvaluationScope,
        #[arg(long)]
        problem: i64,
        /// 频率 0-4
        #[arg(long)]
        frequency: i64,
        /// 严重度 0-4
        #[arg(long)]
        severity: i64,
    },
    /// 进度
    #[command(subcommand)]
    Progress(ProgressCommand),
    /// 最终汇总（步骤 4）
    Summary {
        #[command(flatten)]
        scope: EvaluationScope,
        /// 输出 JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum EvaluationCommand {
    List(ListArgs),
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// 开始日期 (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        heuristic_set: Option<i64>,
    },
    /// 修改评估配置，只发送给出的字段
    Configure {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        heuristic_set: Option<i64>,
    },
    /// 结束评估（设置结束日期为今天）
    Finalize {
        id: i64,
    },
    Delete {
        id: i64,
        /// 确认级联删除
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum EvaluatorCommand {
    List(ListArgs),
    Create(AccountArgs),
    /// 已分配到评估的评估员
    Assigned {
        #[command(flatten)]
        scope: EvaluationScope,
    },
    Assign {
        #[command(flatten)]
        scope: EvaluationScope,
        evaluator: i64,
    },
    Remove {
        #[command(flatten)]
        scope: EvaluationScope,
        evaluator: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum CoordinatorCommand {
    List(ListArgs),
    Create(AccountArgs),
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ProblemCommand {
    /// 列出问题（评估员只看自己的）
    List {
        #[command(flatten)]
        scope: EvaluationScope,
        #[command(flatten)]
        list: ListArgs,
    },
    Add {
        #[command(flatten)]
        scope: EvaluationScope,
        #[command(flatten)]
        content: ProblemContent,
        /// 证据截图 (jpg/jpeg/png, ≤5MB)
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_heuristic)]
        heuristic: Option<Heuristic>,
        #[arg(long)]
        example: Option<String>,
    },
    Delete {
        id: i64,
    },
    History {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProgressCommand {
    Show {
        #[command(flatten)]
        scope: EvaluationScope,
    },
    /// 完成当前步骤
    Advance {
        #[command(flatten)]
        scope: EvaluationScope,
        /// 确认进入下一步
        #[arg(long)]
        yes: bool,
    },
}

/// 未给出时使用会话中选择的评估
#[derive(Args, Debug, Clone, Copy)]
pub struct EvaluationScope {
    #[arg(long)]
    pub evaluation: Option<i64>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    #[arg(long, default_value_t = 20)]
    pub per_page: usize,
}

impl ListArgs {
    /// 不分页
    pub fn all() -> Self {
        Self {
            search: None,
            page: 1,
            per_page: usize::MAX,
        }
    }

    pub fn query(&self) -> ListQuery {
        ListQuery {
            search: self.search.clone(),
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AccountArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Args, Debug, Clone)]
pub struct ProblemContent {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    /// 违反的原则：编号 1-10 或名称
    #[arg(long, value_parser = parse_heuristic)]
    pub heuristic: Heuristic,
    #[arg(long, default_value = "")]
    pub example: String,
}

fn parse_heuristic(s: &str) -> Result<Heuristic, String> {
    Heuristic::from_alias(s).map_err(|e| e.to_string())
}
