mod support;

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value as JsonValue};
use tempfile::{tempdir, TempDir};

use heuristic_eval::cli::{
    Command, EvaluationCommand, EvaluationScope, ProblemCommand, ProgressCommand,
};
use heuristic_eval::error::{AppError, AuthError, WorkflowError};
use heuristic_eval::models::{EvaluationId, Role};
use heuristic_eval::services::EvaluationService;
use heuristic_eval::{App, Config, Session, SessionStore};
use support::{
    as_api, evaluation_json, evaluator_json, make_token, problem_json, score_json, Method, MockApi,
};

struct Fixture {
    _dir: TempDir,
    config: Config,
    mock: Arc<MockApi>,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let config = Config {
            session_file: dir.path().join("session.toml"),
            ..Config::default()
        };
        Self {
            _dir: dir,
            config,
            mock: MockApi::new(),
        }
    }

    /// 预先写入一个已登录的会话
    fn logged_in(self, id: i64, role: Role, evaluation: Option<i64>) -> Self {
        let token = make_token(json!({ "id": id, "correo": "usuario@uni.edu", "exp": 4102444800i64 }));
        let mut session = Session::from_token(token, role).unwrap();
        session.current_evaluation = evaluation.map(EvaluationId);
        SessionStore::new(self.config.session_file.clone())
            .save(&session)
            .unwrap();
        self
    }

    fn app(&self) -> App {
        App::with_api(self.config.clone(), as_api(&self.mock)).unwrap()
    }
}

fn scope(evaluation: Option<i64>) -> EvaluationScope {
    EvaluationScope { evaluation }
}

#[tokio::test]
async fn test_commands_require_login() {
    let fixture = Fixture::new();
    let mut app = fixture.app();

    let err = app
        .run(Command::Evaluations(EvaluationCommand::Delete { id: 3, yes: true }))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Auth(AuthError::NotLoggedIn)));
    assert!(fixture.mock.calls().is_empty());
}

#[tokio::test]
async fn test_login_persists_session_for_next_run() {
    let fixture = Fixture::new();
    let token = make_token(json!({ "id": 8, "correo": "eva@uni.edu", "nombre": "Eva", "exp": 4102444800i64 }));
    fixture
        .mock
        .on(Method::Post, "evaluadores/login", json!({ "token": token }));

    let mut app = fixture.app();
    app.run(Command::Login {
        email: "eva@uni.edu".to_string(),
        password: "secreto".to_string(),
    })
    .await
    .unwrap();

    let restarted = fixture.app();
    let session = restarted.session().unwrap();
    assert_eq!(session.role, Role::Evaluator);
    assert_eq!(session.display_name(), "Eva");

    let mut restarted = restarted;
    restarted.run(Command::Logout).await.unwrap();
    assert!(fixture.app().session().is_none());
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let fixture = Fixture::new().logged_in(7, Role::Coordinator, None);
    fixture
        .mock
        .on(
            Method::Get,
            "evaluaciones/3/problemas",
            json!([problem_json(1, 1, 8, 3), problem_json(2, 2, 9, 3)]),
        )
        .on(Method::Get, "evaluaciones/3/evaluadores", json!([evaluator_json(8)]))
        .on(Method::Delete, "evaluaciones/3", JsonValue::Null);
    let mut app = fixture.app();

    let err = app
        .run(Command::Evaluations(EvaluationCommand::Delete { id: 3, yes: false }))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Workflow(WorkflowError::CascadeNotConfirmed {
            problems: 2,
            evaluators: 1
        })
    ));
    assert_eq!(fixture.mock.count(Method::Delete), 0);

    app.run(Command::Evaluations(EvaluationCommand::Delete { id: 3, yes: true }))
        .await
        .unwrap();
    assert!(fixture.mock.called(Method::Delete, "evaluaciones/3"));
}

#[tokio::test]
async fn test_evaluator_cannot_create_evaluation() {
    let fixture = Fixture::new().logged_in(8, Role::Evaluator, None);
    let mut app = fixture.app();

    let err = app
        .run(Command::Evaluations(EvaluationCommand::Create {
            code: "HE-9".to_string(),
            name: "Portal".to_string(),
            description: String::new(),
            start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            heuristic_set: None,
        }))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Auth(AuthError::RoleNotPermitted { .. })));
    assert!(fixture.mock.calls().is_empty());
}

#[tokio::test]
async fn test_scoring_is_locked_before_step_three() {
    let fixture = Fixture::new().logged_in(8, Role::Evaluator, Some(3));
    fixture.mock.on(
        Method::Get,
        "evaluaciones/3/evaluadores/8/progreso",
        json!({ "evaluacionId": 3, "evaluadorId": 8, "paso": 2 }),
    );
    let mut app = fixture.app();

    let err = app
        .run(Command::Score {
            scope: scope(None),
            problem: 1,
            frequency: 3,
            severity: 2,
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Workflow(WorkflowError::StepLocked { .. })
    ));
    assert_eq!(fixture.mock.count(Method::Put), 0);
}

#[tokio::test]
async fn test_score_reports_backend_criticality() {
    let fixture = Fixture::new().logged_in(8, Role::Evaluator, Some(3));
    fixture
        .mock
        .on(
            Method::Get,
            "evaluaciones/3/evaluadores/8/progreso",
            json!({ "evaluacionId": 3, "evaluadorId": 8, "paso": 3 }),
        )
        .on(
            Method::Put,
            "problemas/1/puntuaciones/8",
            json!({ "criticidad": 12.0 }),
        );
    let mut app = fixture.app();

    let output = app
        .run(Command::Score {
            scope: scope(None),
            problem: 1,
            frequency: 3,
            severity: 4,
        })
        .await
        .unwrap();

    assert!(output.contains("危急度 12.00"), "{}", output);
    assert!(!output.contains("危急度 7"));
    assert_eq!(
        fixture.mock.body_of(Method::Put, "problemas/1/puntuaciones/8"),
        Some(json!({ "frecuencia": 3, "severidad": 4 }))
    );
}

#[tokio::test]
async fn test_advance_counts_pending_scores() {
    let fixture = Fixture::new().logged_in(8, Role::Evaluator, Some(3));
    fixture
        .mock
        .on(
            Method::Get,
            "evaluaciones/3/evaluadores/8/progreso",
            json!({ "evaluacionId": 3, "evaluadorId": 8, "paso": 3 }),
        )
        .on(
            Method::Get,
            "evaluaciones/3/problemas",
            json!([problem_json(1, 1, 8, 3), problem_json(2, 2, 9, 3)]),
        )
        .on(
            Method::Get,
            "evaluaciones/3/puntuaciones",
            json!([score_json(1, 8, 2, 3), score_json(2, 8, 0, 0)]),
        );
    let mut app = fixture.app();

    let err = app
        .run(Command::Progress(ProgressCommand::Advance {
            scope: scope(None),
            yes: true,
        }))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Workflow(WorkflowError::StepIncomplete { pending: 1, .. })
    ));
    assert_eq!(fixture.mock.count(Method::Put), 0);
}

#[tokio::test]
async fn test_evaluator_cannot_delete_foreign_problem() {
    let fixture = Fixture::new().logged_in(8, Role::Evaluator, Some(3));
    fixture
        .mock
        .on(Method::Get, "problemas/2", problem_json(2, 2, 9, 3));
    let mut app = fixture.app();

    let err = app
        .run(Command::Problems(ProblemCommand::Delete { id: 2 }))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Auth(AuthError::NotProblemOwner(2))));
    assert_eq!(fixture.mock.count(Method::Delete), 0);
}

#[tokio::test]
async fn test_coordinator_summary_report() {
    let fixture = Fixture::new().logged_in(7, Role::Coordinator, None);
    fixture
        .mock
        .on(Method::Get, "evaluaciones/3", evaluation_json(3, false))
        .on(
            Method::Get,
            "evaluaciones/3/problemas",
            json!([problem_json(1, 1, 8, 3), problem_json(2, 2, 9, 3)]),
        )
        .on(
            Method::Get,
            "evaluaciones/3/puntuaciones",
            json!([
                score_json(1, 8, 0, 0),
                score_json(1, 9, 2, 3),
                score_json(1, 10, 4, 1),
                score_json(2, 8, 1, 1),
            ]),
        )
        .on(
            Method::Get,
            "evaluaciones/3/evaluadores",
            json!([evaluator_json(8), evaluator_json(9)]),
        );
    let mut app = fixture.app();

    let report = app
        .run(Command::Summary {
            scope: scope(Some(3)),
            json: false,
        })
        .await
        .unwrap();

    assert!(report.contains("Portal de alumnos (HE-3)"));
    assert!(report.contains("Evaluador 8 Pérez"));
    // 问题 1: 频率 (2+4)/2=3, 严重度 (3+1)/2=2, 危急度 5
    assert!(report.contains("| 1 | Problema 1 | P1 | 3.00 | 2.00 | 5.00 |"));
    let first = report.find("Problema 1").unwrap();
    let second = report.find("Problema 2").unwrap();
    assert!(first < second);
}

#[tokio::test]
async fn test_finished_evaluation_cannot_be_finalized_again() {
    let mock = MockApi::new();
    mock.on(Method::Get, "evaluaciones/3", evaluation_json(3, true));
    let service = EvaluationService::new(as_api(&mock));

    let err = service.finalize(EvaluationId(3)).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Workflow(WorkflowError::EvaluationAlreadyFinished)
    ));
    assert_eq!(mock.count(Method::Put), 0);
}

#[tokio::test]
async fn test_evaluation_scope_falls_back_to_session() {
    let fixture = Fixture::new().logged_in(8, Role::Evaluator, None);
    let mut app = fixture.app();

    let err = app
        .run(Command::Progress(ProgressCommand::Show { scope: scope(None) }))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Workflow(WorkflowError::NoEvaluationSelected)
    ));
}
