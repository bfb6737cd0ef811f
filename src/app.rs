use std::fmt::Write;
use std::sync::Arc;

use chrono::Local;
use futures::try_join;
use tracing::{debug, info};

use crate::cli::{
    AccountArgs, Command, CoordinatorCommand, EvaluationCommand, EvaluationScope, EvaluatorCommand,
    ListArgs, ProblemCommand, ProblemContent, ProgressCommand,
};
use crate::clients::{HttpClient, RestApi};
use crate::config::Config;
use crate::error::{AppError, AppResult, AuthError, WorkflowError};
use crate::models::{
    EvaluationConfig, EvaluationId, Evaluator, EvaluatorId, NewAccount, NewEvaluation, Problem,
    ProblemDraft, ProblemId, ProblemUpdate, Role, Step,
};
use crate::scoring::FinalSummary;
use crate::services::{
    AuthService, CoordinatorService, EvaluationService, EvaluatorService, ProblemService,
    ProgressService, ScoreService, UploadService,
};
use crate::session::{Session, SessionStore};
use crate::utils::logging::{log_session, truncate_text};
use crate::utils::PageSlice;
use crate::workflow::{
    pending_scores, ConsolidationFlow, EvaluationFlow, ProblemFlow, ProgressFlow, ProgressTracker,
    StepAccess, StepRequirements,
};

/// 应用主结构
///
/// 持有所有服务和当前会话，`run` 执行一条命令并返回要打印的文本
pub struct App {
    store: SessionStore,
    session: Option<Session>,
    auth: AuthService,
    evaluations: EvaluationService,
    evaluators: EvaluatorService,
    coordinators: CoordinatorService,
    problems: ProblemService,
    progress: ProgressService,
    scores: ScoreService,
    uploads: UploadService,
}

impl App {
    /// 初始化应用：读取本地会话，建立带令牌的 HTTP 客户端
    pub fn initialize(config: Config) -> AppResult<Self> {
        let store = SessionStore::new(config.session_file.clone());
        let session = store.load()?;

        let mut client = HttpClient::new(&config)?;
        if let Some(session) = &session {
            client = client.with_token(session.token.clone());
        }
        debug!("HTTP 客户端就绪: {}", client.base_url());

        Ok(Self::assemble(&config, store, session, Arc::new(client)))
    }

    /// 使用给定的传输层构建应用
    pub fn with_api(config: Config, api: Arc<dyn RestApi>) -> AppResult<Self> {
        let store = SessionStore::new(config.session_file.clone());
        let session = store.load()?;
        Ok(Self::assemble(&config, store, session, api))
    }

    fn assemble(
        config: &Config,
        store: SessionStore,
        session: Option<Session>,
        api: Arc<dyn RestApi>,
    ) -> Self {
        if let Some(session) = &session {
            log_session(session);
        }
        Self {
            store,
            session,
            auth: AuthService::new(api.clone()),
            evaluations: EvaluationService::new(api.clone()),
            evaluators: EvaluatorService::new(api.clone(), config),
            coordinators: CoordinatorService::new(api.clone()),
            problems: ProblemService::new(api.clone()),
            progress: ProgressService::new(api.clone()),
            scores: ScoreService::new(api.clone()),
            uploads: UploadService::new(api, config),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// 执行一条命令
    pub async fn run(&mut self, command: Command) -> AppResult<String> {
        match command {
            Command::Login { email, password } => self.login(&email, &password).await,
            Command::Logout => self.logout(),
            Command::Whoami => self.whoami(),
            Command::Use { evaluation } => self.use_evaluation(EvaluationId(evaluation)).await,
            Command::Evaluations(cmd) => self.run_evaluations(cmd).await,
            Command::Evaluators(cmd) => self.run_evaluators(cmd).await,
            Command::Coordinators(cmd) => self.run_coordinators(cmd).await,
            Command::Problems(cmd) => self.run_problems(cmd).await,
            Command::Consolidate {
                scope,
                problems,
                content,
            } => self.consolidate(scope, &problems, content).await,
            Command::Score {
                scope,
                problem,
                frequency,
                severity,
            } => self.score(scope, ProblemId(problem), frequency, severity).await,
            Command::Progress(cmd) => self.run_progress(cmd).await,
            Command::Summary { scope, json } => self.summary(scope, json).await,
        }
    }

    // ========== 会话 ==========

    async fn login(&mut self, email: &str, password: &str) -> AppResult<String> {
        let session = self.auth.login(email, password).await?;
        self.store.save(&session)?;
        let output = format!("✓ 已登录: {} ({})", session.display_name(), session.role);
        self.session = Some(session);
        Ok(output)
    }

    fn logout(&mut self) -> AppResult<String> {
        self.store.clear()?;
        self.session = None;
        Ok("✓ 已退出登录".to_string())
    }

    fn whoami(&self) -> AppResult<String> {
        let session = self.require_session()?;
        let mut output = String::new();
        let _ = writeln!(output, "用户: {} <{}>", session.display_name(), session.claims.email);
        let _ = writeln!(output, "角色: {}", session.role);
        if let Some(evaluation) = session.current_evaluation {
            let _ = writeln!(output, "当前评估: {}", evaluation);
        }
        Ok(output)
    }

    async fn use_evaluation(&mut self, id: EvaluationId) -> AppResult<String> {
        let session = self.require_session()?.clone();
        let evaluation = self.evaluations.get(id).await?;
        let session = session.with_evaluation(id);
        self.store.save(&session)?;
        self.session = Some(session);
        Ok(format!("✓ 当前评估: {} {}", evaluation.code, evaluation.name))
    }

    fn require_session(&self) -> AppResult<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| AuthError::NotLoggedIn.into())
    }

    fn require_role(&self, allowed: &[Role]) -> AppResult<&Session> {
        let session = self.require_session()?;
        session.require_role(allowed)?;
        Ok(session)
    }

    /// 命令行参数优先，其次是会话中选择的评估
    fn resolve_evaluation(&self, scope: EvaluationScope) -> AppResult<EvaluationId> {
        let session = self.require_session()?;
        scope
            .evaluation
            .map(EvaluationId)
            .or(session.current_evaluation)
            .ok_or_else(|| WorkflowError::NoEvaluationSelected.into())
    }

    /// 评估员必须已到达某一步骤
    async fn require_step(
        &self,
        evaluation: EvaluationId,
        evaluator: EvaluatorId,
        step: Step,
    ) -> AppResult<()> {
        let tracker = ProgressTracker::new(self.progress.get(evaluation, evaluator).await?);
        match tracker.can_enter(step) {
            StepAccess::Open => Ok(()),
            StepAccess::Locked { required, current } => {
                Err(WorkflowError::StepLocked { required, current }.into())
            }
        }
    }

    // ========== 评估 ==========

    async fn run_evaluations(&self, cmd: EvaluationCommand) -> AppResult<String> {
        match cmd {
            EvaluationCommand::List(list) => {
                let session = self.require_session()?;
                let items = match session.role {
                    Role::Administrator => self.evaluations.list_all().await?,
                    Role::Coordinator => {
                        self.evaluations
                            .list_for_coordinator(session.coordinator_id()?)
                            .await?
                    }
                    Role::Evaluator => {
                        self.evaluations
                            .list_for_evaluator(session.evaluator_id()?)
                            .await?
                    }
                };
                let page = list.query().apply(items, |e| format!("{} {}", e.code, e.name));
                Ok(render_page(&page, "评估", |e| {
                    let status = if e.is_finished() { "已结束" } else { "进行中" };
                    format!("[{}] {} {} ({}, 开始 {})", e.id, e.code, e.name, status, e.start_date)
                }))
            }
            EvaluationCommand::Show { id } => {
                self.require_session()?;
                let evaluation = self.evaluations.get(EvaluationId(id)).await?;
                let mut output = String::new();
                let _ = writeln!(output, "{} {}", evaluation.code, evaluation.name);
                let _ = writeln!(output, "{}", evaluation.description);
                let _ = writeln!(output, "开始: {}", evaluation.start_date);
                match evaluation.end_date {
                    Some(end) => {
                        let _ = writeln!(output, "结束: {}", end);
                    }
                    None => {
                        let _ = writeln!(output, "结束: -");
                    }
                }
                let _ = writeln!(output, "协调员: {}", evaluation.coordinator_id);
                Ok(output)
            }
            EvaluationCommand::Create {
                code,
                name,
                description,
                start,
                heuristic_set,
            } => {
                let coordinator = self.require_role(&[Role::Coordinator])?.coordinator_id()?;
                let created = self
                    .evaluations
                    .create(&NewEvaluation {
                        code,
                        name,
                        description,
                        start_date: start,
                        coordinator_id: coordinator,
                        heuristic_set,
                    })
                    .await?;
                Ok(format!("✓ 已创建评估 [{}] {}", created.id, created.code))
            }
            EvaluationCommand::Configure {
                id,
                name,
                description,
                start,
                heuristic_set,
            } => {
                self.require_role(&[Role::Coordinator])?;
                let updated = self
                    .evaluations
                    .configure(
                        EvaluationId(id),
                        &EvaluationConfig {
                            name,
                            description,
                            start_date: start,
                            heuristic_set,
                        },
                    )
                    .await?;
                Ok(format!("✓ 评估 {} 配置已保存", updated.code))
            }
            EvaluationCommand::Finalize { id } => {
                self.require_role(&[Role::Coordinator])?;
                let finished = self.evaluation_flow().finalize(EvaluationId(id)).await?;
                let end = finished
                    .end_date
                    .unwrap_or_else(|| Local::now().date_naive());
                Ok(format!("✓ 评估 {} 已于 {} 结束", finished.code, end))
            }
            EvaluationCommand::Delete { id, yes } => {
                self.require_role(&[Role::Coordinator, Role::Administrator])?;
                let impact = self.evaluation_flow().delete(EvaluationId(id), yes).await?;
                Ok(format!(
                    "✓ 评估 {} 已删除 (问题 {}, 评估员分配 {})",
                    id, impact.problems, impact.evaluators
                ))
            }
        }
    }

    fn evaluation_flow(&self) -> EvaluationFlow<'_> {
        EvaluationFlow::new(&self.evaluations, &self.evaluators, &self.problems)
    }

    // ========== 评估员 / 协调员 ==========

    async fn run_evaluators(&self, cmd: EvaluatorCommand) -> AppResult<String> {
        match cmd {
            EvaluatorCommand::List(list) => {
                self.require_role(&[Role::Administrator, Role::Coordinator])?;
                let items = self.evaluators.list().await?;
                Ok(render_evaluators(&list, items))
            }
            EvaluatorCommand::Create(account) => {
                self.require_role(&[Role::Administrator, Role::Coordinator])?;
                let created = self.evaluators.create(&new_account(account)).await?;
                Ok(format!("✓ 已创建评估员 [{}] {}", created.id, created.full_name()))
            }
            EvaluatorCommand::Assigned { scope } => {
                self.require_role(&[Role::Administrator, Role::Coordinator])?;
                let evaluation = self.resolve_evaluation(scope)?;
                let items = self.evaluators.list_for_evaluation(evaluation).await?;
                Ok(render_evaluators(&ListArgs::all(), items))
            }
            EvaluatorCommand::Assign { scope, evaluator } => {
                self.require_role(&[Role::Coordinator])?;
                let evaluation = self.resolve_evaluation(scope)?;
                self.evaluators
                    .assign(evaluation, EvaluatorId(evaluator))
                    .await?;
                Ok(format!("✓ 评估员 {} 已分配到评估 {}", evaluator, evaluation))
            }
            EvaluatorCommand::Remove { scope, evaluator } => {
                self.require_role(&[Role::Coordinator])?;
                let evaluation = self.resolve_evaluation(scope)?;
                self.evaluators
                    .remove(evaluation, EvaluatorId(evaluator))
                    .await?;
                Ok(format!("✓ 评估员 {} 已从评估 {} 移除", evaluator, evaluation))
            }
        }
    }

    async fn run_coordinators(&self, cmd: CoordinatorCommand) -> AppResult<String> {
        self.require_role(&[Role::Administrator])?;
        match cmd {
            CoordinatorCommand::List(list) => {
                let items = self.coordinators.list().await?;
                let page = list
                    .query()
                    .apply(items, |c| format!("{} {} {}", c.name, c.last_name, c.email));
                Ok(render_page(&page, "协调员", |c| {
                    format!("[{}] {} {} <{}>", c.id, c.name, c.last_name, c.email)
                }))
            }
            CoordinatorCommand::Create(account) => {
                let created = self.coordinators.create(&new_account(account)).await?;
                Ok(format!("✓ 已创建协调员 [{}] {}", created.id, created.email))
            }
            CoordinatorCommand::Delete { id } => {
                self.coordinators.delete(id.into()).await?;
                Ok(format!("✓ 协调员 {} 已删除", id))
            }
        }
    }

    // ========== 问题 ==========

    async fn run_problems(&self, cmd: ProblemCommand) -> AppResult<String> {
        match cmd {
            ProblemCommand::List { scope, list } => {
                let session = self.require_session()?;
                let evaluation = self.resolve_evaluation(scope)?;
                let items = match session.role {
                    Role::Evaluator => {
                        self.problems
                            .list_for_evaluator(evaluation, session.evaluator_id()?)
                            .await?
                    }
                    _ => self.problems.list_for_evaluation(evaluation).await?,
                };
                let page = list
                    .query()
                    .apply(items, |p| format!("{} {}", p.title, p.description));
                Ok(render_page(&page, "问题", render_problem_line))
            }
            ProblemCommand::Add {
                scope,
                content,
                image,
            } => {
                let evaluator = self.require_role(&[Role::Evaluator])?.evaluator_id()?;
                let evaluation = self.resolve_evaluation(scope)?;
                let flow = ProblemFlow::new(&self.problems, &self.uploads);
                let problem = flow
                    .report_problem(evaluation, evaluator, draft(content), image.as_deref())
                    .await?;
                Ok(format!("✓ 已登记问题 #{} [{}]", problem.number, problem.id))
            }
            ProblemCommand::Edit {
                id,
                title,
                description,
                heuristic,
                example,
            } => {
                let evaluator = self.require_role(&[Role::Evaluator])?.evaluator_id()?;
                let id = ProblemId(id);
                self.require_owner(id, evaluator).await?;
                let update = ProblemUpdate {
                    title,
                    description,
                    heuristic,
                    example,
                    image: None,
                };
                let problem = self.problems.update(id, evaluator, &update).await?;
                Ok(format!("✓ 问题 #{} 已保存", problem.number))
            }
            ProblemCommand::Delete { id } => {
                let evaluator = self.require_role(&[Role::Evaluator])?.evaluator_id()?;
                let id = ProblemId(id);
                self.require_owner(id, evaluator).await?;
                self.problems.delete(id).await?;
                Ok(format!("✓ 问题 {} 已删除", id))
            }
            ProblemCommand::History { id } => {
                self.require_session()?;
                let entries = self.problems.history(ProblemId(id)).await?;
                if entries.is_empty() {
                    return Ok(format!("问题 {} 没有修改记录", id));
                }
                let mut output = String::new();
                for entry in entries {
                    let _ = writeln!(
                        output,
                        "{} 评估员 {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M"),
                        entry.evaluator_id
                    );
                    for change in entry.changes {
                        let _ = writeln!(
                            output,
                            "  {}: {} → {}",
                            change.field,
                            truncate_text(&change.before, 40),
                            truncate_text(&change.after, 40)
                        );
                    }
                }
                Ok(output)
            }
        }
    }

    async fn require_owner(&self, id: ProblemId, evaluator: EvaluatorId) -> AppResult<Problem> {
        let problem = self.problems.get(id).await?;
        if problem.evaluator_id != evaluator {
            return Err(AuthError::NotProblemOwner(id.0).into());
        }
        Ok(problem)
    }

    async fn consolidate(
        &self,
        scope: EvaluationScope,
        sources: &[i64],
        content: ProblemContent,
    ) -> AppResult<String> {
        let evaluator = self.require_role(&[Role::Evaluator])?.evaluator_id()?;
        let evaluation = self.resolve_evaluation(scope)?;
        self.require_step(evaluation, evaluator, Step::Consolidation)
            .await?;

        let sources: Vec<ProblemId> = sources.iter().copied().map(ProblemId).collect();
        let outcome = ConsolidationFlow::new(&self.problems)
            .consolidate(evaluation, evaluator, &sources, &draft(content))
            .await?;

        let mut output = format!(
            "✓ 已合并为问题 #{} [{}]，删除原问题 {} 个",
            outcome.merged.number,
            outcome.merged.id,
            outcome.deleted.len()
        );
        for (id, reason) in &outcome.failed_deletes {
            let _ = write!(output, "\n⚠️ 原问题 {} 删除失败: {}", id, reason);
        }
        Ok(output)
    }

    // ========== 评分 / 进度 / 汇总 ==========

    async fn score(
        &self,
        scope: EvaluationScope,
        problem: ProblemId,
        frequency: i64,
        severity: i64,
    ) -> AppResult<String> {
        let evaluator = self.require_role(&[Role::Evaluator])?.evaluator_id()?;
        let evaluation = self.resolve_evaluation(scope)?;
        self.require_step(evaluation, evaluator, Step::Scoring).await?;
        let criticality = self
            .scores
            .submit(problem, evaluator, frequency, severity)
            .await?;

        let mut output = format!(
            "✓ 问题 {} 评分: 频率 {} 严重度 {}",
            problem, frequency, severity
        );
        if let Some(criticality) = criticality {
            let _ = write!(output, " 危急度 {:.2}", criticality);
        }
        Ok(output)
    }

    async fn run_progress(&self, cmd: ProgressCommand) -> AppResult<String> {
        let evaluator = self.require_role(&[Role::Evaluator])?.evaluator_id()?;
        match cmd {
            ProgressCommand::Show { scope } => {
                let evaluation = self.resolve_evaluation(scope)?;
                let step = self.progress.get(evaluation, evaluator).await?;
                let mut output = String::new();
                for candidate in Step::ALL {
                    let marker = if candidate == step {
                        "▶"
                    } else if candidate < step {
                        "✓"
                    } else {
                        " "
                    };
                    let _ = writeln!(output, "{} {}", marker, candidate);
                }
                Ok(output)
            }
            ProgressCommand::Advance { scope, yes } => {
                let evaluation = self.resolve_evaluation(scope)?;
                let mut flow = ProgressFlow::load(&self.progress, evaluation, evaluator).await?;

                let requirements = if flow.tracker().current() == Step::Scoring {
                    let (problems, scores) = try_join!(
                        self.problems.list_for_evaluation(evaluation),
                        self.scores.list_for_evaluation(evaluation)
                    )?;
                    StepRequirements {
                        pending_scores: pending_scores(&problems, &scores, evaluator),
                    }
                } else {
                    StepRequirements::default()
                };

                let step = flow.advance(requirements, yes).await?;
                Ok(format!("✓ 已进入步骤 {}", step))
            }
        }
    }

    async fn summary(&self, scope: EvaluationScope, json: bool) -> AppResult<String> {
        let session = self.require_session()?;
        let evaluation = self.resolve_evaluation(scope)?;
        if session.role == Role::Evaluator {
            self.require_step(evaluation, session.evaluator_id()?, Step::FinalSummary)
                .await?;
        }

        let (detail, problems, scores, evaluators) = try_join!(
            self.evaluations.get(evaluation),
            self.problems.list_for_evaluation(evaluation),
            self.scores.list_for_evaluation(evaluation),
            self.evaluators.list_for_evaluation(evaluation)
        )?;

        let summary = FinalSummary::build(&detail, &problems, &scores, &evaluators);
        info!(
            "📊 评估 {} 汇总: {} 个问题, {} 条评分",
            detail.code,
            problems.len(),
            scores.len()
        );

        if json {
            serde_json::to_string_pretty(&summary).map_err(|e| AppError::Other(e.to_string()))
        } else {
            Ok(summary.render_text())
        }
    }
}

// ========== 输出辅助函数 ==========

fn new_account(args: AccountArgs) -> NewAccount {
    NewAccount {
        name: args.name,
        last_name: args.last_name,
        email: args.email,
        password: args.password,
    }
}

fn draft(content: ProblemContent) -> ProblemDraft {
    ProblemDraft {
        title: content.title,
        description: content.description,
        heuristic: content.heuristic,
        example: content.example,
        image: None,
    }
}

fn render_page<T>(page: &PageSlice<T>, label: &str, line: impl Fn(&T) -> String) -> String {
    let mut output = String::new();
    if page.items.is_empty() {
        let _ = writeln!(output, "没有找到{}", label);
    }
    for item in &page.items {
        let _ = writeln!(output, "- {}", line(item));
    }
    if page.total_pages > 1 {
        let _ = writeln!(
            output,
            "第 {}/{} 页，共 {} 个{}",
            page.page, page.total_pages, page.total_items, label
        );
    }
    output
}

fn render_evaluators(list: &ListArgs, items: Vec<Evaluator>) -> String {
    let page = list
        .query()
        .apply(items, |e| format!("{} {}", e.full_name(), e.email));
    render_page(&page, "评估员", |e| {
        format!("[{}] {} <{}>", e.id, e.full_name(), e.email)
    })
}

fn render_problem_line(problem: &Problem) -> String {
    let mut line = format!(
        "#{} [{}] {} ({})",
        problem.number,
        problem.id,
        truncate_text(&problem.title, 60),
        problem.heuristic
    );
    if problem.is_consolidated() {
        let _ = write!(line, " 合并自 {} 个问题", problem.origins.len());
    }
    line
}
