//! 登记带证据图片的问题（步骤 1）
//!
//! 先上传图片再创建问题。创建失败时已上传的文件不会被清理，只记录日志

use std::path::Path;

use tracing::{info, warn};

use crate::error::AppResult;
use crate::models::{EvaluationId, EvaluatorId, Problem, ProblemDraft};
use crate::services::{ProblemService, UploadService};

pub struct ProblemFlow<'a> {
    problems: &'a ProblemService,
    uploads: &'a UploadService,
}

impl<'a> ProblemFlow<'a> {
    pub fn new(problems: &'a ProblemService, uploads: &'a UploadService) -> Self {
        Self { problems, uploads }
    }

    pub async fn report_problem(
        &self,
        evaluation: EvaluationId,
        evaluator: EvaluatorId,
        mut draft: ProblemDraft,
        image: Option<&Path>,
    ) -> AppResult<Problem> {
        draft.validate()?;

        let mut uploaded_path = None;
        if let Some(path) = image {
            let uploaded = self.uploads.upload_image(path).await?;
            draft.image = Some(uploaded.path.clone());
            uploaded_path = Some(uploaded.path);
        }

        match self.problems.create(evaluation, evaluator, &draft).await {
            Ok(problem) => {
                info!("✓ 评估员 {} 登记问题 #{}", evaluator, problem.number);
                Ok(problem)
            }
            Err(e) => {
                if let Some(orphan) = &uploaded_path {
                    warn!("⚠️ 问题创建失败，已上传的图片成为孤立文件: {}", orphan);
                }
                Err(e)
            }
        }
    }
}
