//! 最终汇总报告（步骤 4）

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

use crate::models::{Evaluation, Evaluator, Heuristic, Problem, Score};
use crate::scoring::aggregate::{aggregate_by_problem, ProblemScoreRow};
use crate::scoring::criticality::{tier, CriticalityTier};

/// 按启发式原则统计
#[derive(Debug, Clone, Serialize)]
pub struct HeuristicSummary {
    pub heuristic: Heuristic,
    pub problems: usize,
    pub average_criticality: f64,
}

/// 最终汇总
#[derive(Debug, Clone, Serialize)]
pub struct FinalSummary {
    pub evaluation_code: String,
    pub evaluation_name: String,
    pub evaluators: Vec<String>,
    /// 按平均危急度降序，其次按序号
    pub rows: Vec<ProblemScoreRow>,
    pub by_heuristic: Vec<HeuristicSummary>,
    pub tier_counts: BTreeMap<CriticalityTier, usize>,
}

impl FinalSummary {
    pub fn build(
        evaluation: &Evaluation,
        problems: &[Problem],
        scores: &[Score],
        evaluators: &[Evaluator],
    ) -> Self {
        let mut rows = aggregate_by_problem(problems, scores);
        rows.sort_by(|a, b| {
            b.criticality()
                .partial_cmp(&a.criticality())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.number.cmp(&b.number))
        });

        let mut grouped: BTreeMap<Heuristic, Vec<f64>> = BTreeMap::new();
        for row in &rows {
            grouped.entry(row.heuristic).or_default().push(row.criticality());
        }
        let by_heuristic = grouped
            .into_iter()
            .map(|(heuristic, values)| HeuristicSummary {
                heuristic,
                problems: values.len(),
                average_criticality: values.iter().sum::<f64>() / values.len() as f64,
            })
            .collect();

        let mut tier_counts = BTreeMap::new();
        for row in &rows {
            *tier_counts.entry(row.tier).or_insert(0) += 1;
        }

        Self {
            evaluation_code: evaluation.code.clone(),
            evaluation_name: evaluation.name.clone(),
            evaluators: evaluators.iter().map(|e| e.full_name()).collect(),
            rows,
            by_heuristic,
            tier_counts,
        }
    }

    /// 渲染为 Markdown 文本
    pub fn render_text(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "# Resumen final: {} ({})",
            self.evaluation_name, self.evaluation_code
        );
        let _ = writeln!(output, "Evaluadores: {}", self.evaluators.join(", "));
        let _ = writeln!(output);
        let _ = writeln!(output, "## Problemas por criticidad");

        if self.rows.is_empty() {
            let _ = writeln!(output, "No se registraron problemas.");
        } else {
            let _ = writeln!(output, "| # | Problema | Principio | F | S | C | Nivel |");
            let _ = writeln!(output, "|---|---|---|---|---|---|---|");
            for row in &self.rows {
                match row.average {
                    Some(avg) => {
                        let _ = writeln!(
                            output,
                            "| {} | {} | P{} | {:.2} | {:.2} | {:.2} | {} |",
                            row.number,
                            row.title,
                            row.heuristic.code(),
                            avg.frequency,
                            avg.severity,
                            avg.criticality,
                            row.tier
                        );
                    }
                    None => {
                        let _ = writeln!(
                            output,
                            "| {} | {} | P{} | - | - | - | {} |",
                            row.number,
                            row.title,
                            row.heuristic.code(),
                            row.tier
                        );
                    }
                }
            }
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "## Principios incumplidos");
        for summary in &self.by_heuristic {
            let _ = writeln!(
                output,
                "- {}: {} problemas (criticidad media {:.2}, {})",
                summary.heuristic,
                summary.problems,
                summary.average_criticality,
                tier(summary.average_criticality)
            );
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "## Distribución por nivel");
        for (level, count) in &self.tier_counts {
            let _ = writeln!(output, "- {} ({}): {}", level, level.color(), count);
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CoordinatorId, EvaluationId, EvaluatorId, ProblemId, ScoreInput};
    use chrono::NaiveDate;

    fn evaluation() -> Evaluation {
        Evaluation {
            id: EvaluationId(1),
            code: "HE-01".to_string(),
            name: "Portal".to_string(),
            description: String::new(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
            coordinator_id: CoordinatorId(1),
            heuristic_set: None,
        }
    }

    fn problem(id: i64, number: u32, heuristic: Heuristic) -> Problem {
        Problem {
            id: ProblemId(id),
            number,
            title: format!("Problema {}", number),
            description: String::new(),
            heuristic,
            example: String::new(),
            image: None,
            evaluator_id: EvaluatorId(1),
            evaluation_id: EvaluationId(1),
            origins: Vec::new(),
        }
    }

    fn score(problem: i64, frequency: i64, severity: i64, criticality: f64) -> Score {
        let input = ScoreInput::new(frequency, severity).unwrap();
        Score {
            problem_id: ProblemId(problem),
            evaluator_id: EvaluatorId(1),
            frequency: input.frequency,
            severity: input.severity,
            criticality,
        }
    }

    #[test]
    fn test_rows_sorted_by_criticality() {
        let problems = vec![
            problem(10, 1, Heuristic::VisibilityOfSystemStatus),
            problem(20, 2, Heuristic::ErrorPrevention),
            problem(30, 3, Heuristic::ErrorPrevention),
        ];
        let scores = vec![score(10, 1, 1, 2.0), score(20, 4, 4, 8.0)];

        let summary = FinalSummary::build(&evaluation(), &problems, &scores, &[]);
        let order: Vec<u32> = summary.rows.iter().map(|r| r.number).collect();
        assert_eq!(order, vec![2, 1, 3]);
        assert!(summary.rows[2].average.is_none());
        assert_eq!(summary.tier_counts.get(&CriticalityTier::High), Some(&1));
        assert_eq!(summary.tier_counts.get(&CriticalityTier::None), Some(&1));

        let prevention = summary
            .by_heuristic
            .iter()
            .find(|h| h.heuristic == Heuristic::ErrorPrevention)
            .unwrap();
        assert_eq!(prevention.problems, 2);
        assert_eq!(prevention.average_criticality, 4.0);
    }

    #[test]
    fn test_render_mentions_every_problem() {
        let problems = vec![problem(10, 1, Heuristic::HelpAndDocumentation)];
        let summary = FinalSummary::build(&evaluation(), &problems, &[], &[]);
        let text = summary.render_text();
        assert!(text.contains("Problema 1"));
        assert!(text.contains("HE-01"));
    }
}
