mod support;

use serde_json::{json, Value as JsonValue};

use heuristic_eval::config::Config;
use heuristic_eval::error::{AppError, ValidationError};
use heuristic_eval::models::{EvaluationId, EvaluatorId};
use heuristic_eval::services::EvaluatorService;
use support::{as_api, evaluator_json, problem_json, Method, MockApi};

const ASSIGNED: &str = "evaluaciones/3/evaluadores";

fn assigned(n: i64) -> JsonValue {
    JsonValue::Array((1..=n).map(evaluator_json).collect())
}

#[tokio::test]
async fn test_sixth_evaluator_is_rejected_before_post() {
    let mock = MockApi::new();
    mock.on(Method::Get, ASSIGNED, assigned(5));
    let service = EvaluatorService::new(as_api(&mock), &Config::default());

    let err = service
        .assign(EvaluationId(3), EvaluatorId(6))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::EvaluatorLimitReached { limit: 5 })
    ));
    assert_eq!(mock.count(Method::Post), 0);
}

#[tokio::test]
async fn test_fifth_evaluator_is_assigned() {
    let mock = MockApi::new();
    mock.on(Method::Get, ASSIGNED, assigned(4))
        .on(Method::Post, ASSIGNED, JsonValue::Null);
    let service = EvaluatorService::new(as_api(&mock), &Config::default());

    service.assign(EvaluationId(3), EvaluatorId(5)).await.unwrap();
    assert_eq!(
        mock.body_of(Method::Post, ASSIGNED),
        Some(json!({ "evaluadorId": 5 }))
    );
}

#[tokio::test]
async fn test_duplicate_assignment_is_rejected() {
    let mock = MockApi::new();
    mock.on(Method::Get, ASSIGNED, assigned(2));
    let service = EvaluatorService::new(as_api(&mock), &Config::default());

    let err = service
        .assign(EvaluationId(3), EvaluatorId(2))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::EvaluatorAlreadyAssigned)
    ));
    assert_eq!(mock.count(Method::Post), 0);
}

#[tokio::test]
async fn test_configured_limit_is_respected() {
    let mock = MockApi::new();
    mock.on(Method::Get, ASSIGNED, assigned(2));
    let config = Config {
        max_evaluators_per_evaluation: 2,
        ..Config::default()
    };
    let service = EvaluatorService::new(as_api(&mock), &config);

    assert!(service.assign(EvaluationId(3), EvaluatorId(9)).await.is_err());
    assert_eq!(mock.count(Method::Post), 0);
}

#[tokio::test]
async fn test_evaluator_with_problems_cannot_be_removed() {
    let mock = MockApi::new();
    mock.on(
        Method::Get,
        "evaluaciones/3/evaluadores/4/problemas",
        json!([problem_json(20, 1, 4, 3)]),
    );
    let service = EvaluatorService::new(as_api(&mock), &Config::default());

    let err = service
        .remove(EvaluationId(3), EvaluatorId(4))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::EvaluatorHasProblems { count: 1 })
    ));
    assert_eq!(mock.count(Method::Delete), 0);
}

#[tokio::test]
async fn test_evaluator_without_problems_is_removed() {
    let mock = MockApi::new();
    mock.on(Method::Get, "evaluaciones/3/evaluadores/4/problemas", json!([]))
        .on(Method::Delete, "evaluaciones/3/evaluadores/4", JsonValue::Null);
    let service = EvaluatorService::new(as_api(&mock), &Config::default());

    service.remove(EvaluationId(3), EvaluatorId(4)).await.unwrap();
    assert!(mock.called(Method::Delete, "evaluaciones/3/evaluadores/4"));
}
