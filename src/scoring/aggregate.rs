use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Heuristic, Problem, ProblemId, Score};
use crate::scoring::criticality::{tier, CriticalityTier};

/// 多名评估员评分的平均值
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreAverage {
    pub frequency: f64,
    pub severity: f64,
    pub criticality: f64,
    /// 参与平均的评分条数
    pub evaluators: usize,
}

/// 计算平均分
///
/// 只统计频率或严重度至少一个非零的条目；(0, 0) 视为未评分。
/// 没有任何有效条目时返回 `None`
pub fn average_scores(scores: &[Score]) -> Option<ScoreAverage> {
    let counted: Vec<&Score> = scores.iter().filter(|s| !s.is_untouched()).collect();
    if counted.is_empty() {
        return None;
    }

    let n = counted.len() as f64;
    let (mut frequency, mut severity, mut criticality) = (0.0, 0.0, 0.0);
    for s in &counted {
        frequency += f64::from(s.frequency.get());
        severity += f64::from(s.severity.get());
        criticality += s.criticality;
    }

    Some(ScoreAverage {
        frequency: frequency / n,
        severity: severity / n,
        criticality: criticality / n,
        evaluators: counted.len(),
    })
}

/// 单个问题的汇总行
#[derive(Debug, Clone, Serialize)]
pub struct ProblemScoreRow {
    pub problem_id: ProblemId,
    pub number: u32,
    pub title: String,
    pub heuristic: Heuristic,
    pub average: Option<ScoreAverage>,
    pub tier: CriticalityTier,
}

impl ProblemScoreRow {
    pub fn criticality(&self) -> f64 {
        self.average.map(|a| a.criticality).unwrap_or(0.0)
    }
}

/// 按问题汇总评分，行顺序与输入的问题顺序一致
pub fn aggregate_by_problem(problems: &[Problem], scores: &[Score]) -> Vec<ProblemScoreRow> {
    let mut by_problem: HashMap<ProblemId, Vec<Score>> = HashMap::new();
    for score in scores {
        by_problem
            .entry(score.problem_id)
            .or_default()
            .push(score.clone());
    }

    problems
        .iter()
        .map(|problem| {
            let average = by_problem
                .get(&problem.id)
                .and_then(|s| average_scores(s));
            ProblemScoreRow {
                problem_id: problem.id,
                number: problem.number,
                title: problem.title.clone(),
                heuristic: problem.heuristic,
                tier: tier(average.map(|a| a.criticality).unwrap_or(0.0)),
                average,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EvaluatorId, ScoreInput};

    fn score(evaluator: i64, frequency: i64, severity: i64, criticality: f64) -> Score {
        let input = ScoreInput::new(frequency, severity).unwrap();
        Score {
            problem_id: ProblemId(1),
            evaluator_id: EvaluatorId(evaluator),
            frequency: input.frequency,
            severity: input.severity,
            criticality,
        }
    }

    #[test]
    fn test_untouched_scores_excluded_from_average() {
        let scores = vec![score(1, 0, 0, 0.0), score(2, 2, 3, 5.0), score(3, 4, 1, 5.0)];
        let avg = average_scores(&scores).unwrap();
        assert_eq!(avg.frequency, 3.0);
        assert_eq!(avg.severity, 2.0);
        assert_eq!(avg.criticality, 5.0);
        assert_eq!(avg.evaluators, 2);
    }

    #[test]
    fn test_single_nonzero_component_counts() {
        let scores = vec![score(1, 0, 4, 4.0), score(2, 0, 0, 0.0)];
        let avg = average_scores(&scores).unwrap();
        assert_eq!(avg.frequency, 0.0);
        assert_eq!(avg.severity, 4.0);
        assert_eq!(avg.evaluators, 1);
    }

    #[test]
    fn test_all_untouched_has_no_average() {
        assert!(average_scores(&[score(1, 0, 0, 0.0)]).is_none());
        assert!(average_scores(&[]).is_none());
    }
}
