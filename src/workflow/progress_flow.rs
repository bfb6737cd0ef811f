//! 评估员进度状态机 - 流程层
//!
//! 状态：1 发现问题 → 2 合并 → 3 评分 → 4 最终汇总。
//! 只能由用户显式操作逐步前进，客户端持有的步骤值单调不减。
//! 这只是客户端的渲染门槛，后端不做同样的校验，另一个会话可能领先或落后

use std::collections::HashSet;

use tracing::{info, warn};

use crate::error::{AppResult, WorkflowError};
use crate::models::{EvaluationId, EvaluatorId, Problem, ProblemId, Score, Step};
use crate::services::ProgressService;

/// 进入某一步内容的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAccess {
    Open,
    /// 显示提示面板而不是内容
    Locked { required: Step, current: Step },
}

/// 前进所需的完成条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepRequirements {
    /// 当前评估员尚未评分的问题数
    pub pending_scores: usize,
}

/// 单个 (评估, 评估员) 的本地进度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTracker {
    current: Step,
}

impl ProgressTracker {
    pub fn new(current: Step) -> Self {
        Self { current }
    }

    pub fn current(&self) -> Step {
        self.current
    }

    /// 只有已到达该步骤才能查看其内容
    pub fn can_enter(&self, step: Step) -> StepAccess {
        if self.current >= step {
            StepAccess::Open
        } else {
            StepAccess::Locked {
                required: step,
                current: self.current,
            }
        }
    }

    /// 计算下一步，不修改状态
    ///
    /// - 4 之后没有下一步
    /// - 2→3、3→4 需要用户确认
    /// - 3→4 要求没有待评分的问题
    pub fn plan_advance(&self, requirements: StepRequirements, confirmed: bool) -> Result<Step, WorkflowError> {
        let next = self.current.next().ok_or(WorkflowError::AlreadyFinalStep)?;

        if next >= Step::Scoring && !confirmed {
            return Err(WorkflowError::ConfirmationRequired {
                from: self.current,
                to: next,
            });
        }

        if next == Step::FinalSummary && requirements.pending_scores > 0 {
            return Err(WorkflowError::StepIncomplete {
                step: self.current,
                pending: requirements.pending_scores,
            });
        }

        Ok(next)
    }

    /// 前进一步
    pub fn advance(&mut self, requirements: StepRequirements, confirmed: bool) -> Result<Step, WorkflowError> {
        let next = self.plan_advance(requirements, confirmed)?;
        self.current = next;
        Ok(next)
    }

    /// 用外部值（如重新读取的后端值）同步本地状态，拒绝回退
    pub fn set_step(&mut self, step: Step) -> Result<(), WorkflowError> {
        if step < self.current {
            return Err(WorkflowError::StepRegression {
                current: self.current,
                requested: step,
            });
        }
        self.current = step;
        Ok(())
    }
}

/// 某评估员还没评分（缺失或为 (0, 0)）的问题数
pub fn pending_scores(problems: &[Problem], scores: &[Score], evaluator: EvaluatorId) -> usize {
    let scored: HashSet<ProblemId> = scores
        .iter()
        .filter(|s| s.evaluator_id == evaluator && !s.is_untouched())
        .map(|s| s.problem_id)
        .collect();

    problems.iter().filter(|p| !scored.contains(&p.id)).count()
}

/// 进度流程：状态机 + 一次 PUT
pub struct ProgressFlow<'a> {
    service: &'a ProgressService,
    evaluation: EvaluationId,
    evaluator: EvaluatorId,
    tracker: ProgressTracker,
}

impl<'a> ProgressFlow<'a> {
    /// 从后端读取当前步骤
    pub async fn load(
        service: &'a ProgressService,
        evaluation: EvaluationId,
        evaluator: EvaluatorId,
    ) -> AppResult<ProgressFlow<'a>> {
        let step = service.get(evaluation, evaluator).await?;
        Ok(Self {
            service,
            evaluation,
            evaluator,
            tracker: ProgressTracker::new(step),
        })
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    /// "完成第 N 步"
    ///
    /// 先校验，再写入后端；写入失败时本地状态不变
    pub async fn advance(&mut self, requirements: StepRequirements, confirmed: bool) -> AppResult<Step> {
        let next = self.tracker.plan_advance(requirements, confirmed)?;

        if let Err(e) = self.service.put(self.evaluation, self.evaluator, next).await {
            warn!(
                "⚠️ 进度写入失败，保持在 {}: {}",
                self.tracker.current(),
                e
            );
            return Err(e);
        }

        self.tracker.set_step(next)?;
        info!(
            "✓ 评估 {} 评估员 {} 进入步骤 {}",
            self.evaluation, self.evaluator, next
        );
        Ok(next)
    }
}
