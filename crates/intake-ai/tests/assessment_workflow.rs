//! Integration specifications for the conversation-progress engine.
//!
//! Scenarios drive full assessment conversations through the public service
//! facade and HTTP router, validating scoring, staging, locking, and gating
//! without reaching into private modules.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use intake_ai::assessment::{
        AssessmentService, AssessmentSession, ContextProvider, ProgressConfig, RepositoryError,
        SessionId, SessionRepository, TurnAuthor, UserContext, UserId,
    };

    #[derive(Default, Clone)]
    pub struct MemorySessions {
        sessions: Arc<Mutex<HashMap<SessionId, AssessmentSession>>>,
    }

    impl SessionRepository for MemorySessions {
        fn insert(
            &self,
            session: AssessmentSession,
        ) -> Result<AssessmentSession, RepositoryError> {
            let mut guard = self.sessions.lock().expect("repository mutex poisoned");
            if guard.contains_key(&session.id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(session.id.clone(), session.clone());
            Ok(session)
        }

        fn update(&self, session: AssessmentSession) -> Result<(), RepositoryError> {
            let mut guard = self.sessions.lock().expect("repository mutex poisoned");
            guard.insert(session.id.clone(), session);
            Ok(())
        }

        fn fetch(&self, id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError> {
            let guard = self.sessions.lock().expect("repository mutex poisoned");
            Ok(guard.get(id).cloned())
        }

        fn active_for_user(
            &self,
            user_id: &UserId,
        ) -> Result<Option<AssessmentSession>, RepositoryError> {
            let guard = self.sessions.lock().expect("repository mutex poisoned");
            Ok(guard
                .values()
                .find(|session| session.active && &session.user_id == user_id)
                .cloned())
        }
    }

    #[derive(Default, Clone)]
    pub struct UnknownPatients;

    impl ContextProvider for UnknownPatients {
        fn context_for(&self, _user_id: &UserId) -> UserContext {
            UserContext::default()
        }
    }

    pub fn build_service() -> (
        AssessmentService<MemorySessions, UnknownPatients>,
        Arc<MemorySessions>,
    ) {
        let repository = Arc::new(MemorySessions::default());
        let service = AssessmentService::new(
            repository.clone(),
            Arc::new(UnknownPatients),
            ProgressConfig::default(),
        );
        (service, repository)
    }

    /// A full interview covering the checklist: symptoms and history in
    /// detail, then medications, daily-life impact, and risk factors. The
    /// last attendant question stays open until the closing statement.
    pub fn full_interview() -> Vec<(TurnAuthor, &'static str)> {
        vec![
            (TurnAuthor::Attendant, "What brings you in today?"),
            (
                TurnAuthor::Patient,
                "I have a constant headache and sharp ear pain; I can describe the symptoms in detail.",
            ),
            (TurnAuthor::Attendant, "Any relevant medical history?"),
            (
                TurnAuthor::Patient,
                "I was diagnosed with an ear infection last year and had surgery; I'll be thorough about my treatment.",
            ),
            (TurnAuthor::Attendant, "Do you take any medication?"),
            (
                TurnAuthor::Patient,
                "No regular medication, and nothing like this runs in the family.",
            ),
            (TurnAuthor::Attendant, "How does this affect your daily life?"),
            (
                TurnAuthor::Patient,
                "The ringing interferes with sleep and conversation at work.",
            ),
            (
                TurnAuthor::Attendant,
                "Anything about noise exposure or smoking?",
            ),
            (
                TurnAuthor::Patient,
                "I work around loud noise exposure and I smoke occasionally.",
            ),
        ]
    }

    pub fn run_interview(
        service: &AssessmentService<MemorySessions, UnknownPatients>,
        turns: &[(TurnAuthor, &str)],
    ) -> SessionId {
        let session = service
            .start_session(UserId("patient-7".to_string()))
            .expect("session starts");
        for (author, text) in turns {
            match author {
                TurnAuthor::Patient => service
                    .append_patient_turn(&session.id, text.to_string())
                    .map(|_| ())
                    .expect("patient turn accepted"),
                TurnAuthor::Attendant => service
                    .append_attendant_turn(&session.id, text.to_string())
                    .map(|_| ())
                    .expect("attendant turn accepted"),
            }
        }
        session.id
    }
}

use common::*;
use intake_ai::assessment::{AssessmentServiceError, AssessmentStage, TurnAuthor};

#[test]
fn organic_interview_completes_and_locks_after_the_closing_reply() {
    let (service, _) = build_service();
    let session_id = run_interview(&service, &full_interview());

    // The interview is complete on content, but the attendant's last turn is
    // still an open question, so the session must not lock yet.
    let progress = service.progress(&session_id).expect("progress available");
    assert_eq!(progress.stage, AssessmentStage::Complete);
    assert!(!progress.locked);
    assert!(progress.can_generate_report);

    service
        .append_attendant_turn(
            &session_id,
            "Thank you, that completes our assessment.".to_string(),
        )
        .expect("closing reply accepted");

    let progress = service.progress(&session_id).expect("progress available");
    assert!(progress.locked);

    match service.append_patient_turn(&session_id, "wait, one more thing".to_string()) {
        Err(AssessmentServiceError::SessionLocked) => {}
        other => panic!("expected locked rejection, got {other:?}"),
    }
}

#[test]
fn impatient_user_can_finish_early_without_under_reporting() {
    let (service, repository) = build_service();
    // Six turns, symptoms and history in detail: enough signal for the manual
    // path (score 65) but short of the report bar.
    let session_id = run_interview(
        &service,
        &[
            (TurnAuthor::Attendant, "What brings you in today?"),
            (
                TurnAuthor::Patient,
                "I get sharp pain and headache symptoms; here is every detail.",
            ),
            (TurnAuthor::Attendant, "Any medical history I should know?"),
            (
                TurnAuthor::Patient,
                "I was diagnosed with a thyroid condition and had treatment; I will be thorough.",
            ),
            (TurnAuthor::Attendant, "Understood, thank you."),
            (TurnAuthor::Patient, "Thanks."),
        ],
    );

    let gate = service.report_gate(&session_id).expect("gate available");
    assert!(!gate.allowed);

    let receipt = service
        .request_manual_completion(&session_id)
        .expect("manual completion succeeds");
    assert!(receipt.score >= 80);
    assert_eq!(receipt.stage, AssessmentStage::Complete);
    assert!(receipt.locked);

    let gate = service.report_gate(&session_id).expect("gate available");
    assert!(gate.allowed);
    assert_eq!(gate.deficit, 0);

    use intake_ai::assessment::SessionRepository;
    let stored = repository
        .fetch(&session_id)
        .expect("fetch succeeds")
        .expect("session present");
    assert!(stored.locked);
    assert!(stored.active);
}

#[test]
fn starting_over_supersedes_but_retains_the_old_session() {
    let (service, repository) = build_service();
    let first = run_interview(&service, &full_interview()[..4]);

    let second = service
        .start_session(intake_ai::assessment::UserId("patient-7".to_string()))
        .expect("new session starts");
    assert_ne!(first, second.id);

    use intake_ai::assessment::SessionRepository;
    let prior = repository
        .fetch(&first)
        .expect("fetch succeeds")
        .expect("prior session retained");
    assert!(!prior.active);
    assert!(prior.locked);
    assert_eq!(prior.message_count(), 4);

    match service.append_patient_turn(&first, "hello again".to_string()) {
        Err(AssessmentServiceError::SessionLocked) => {}
        other => panic!("expected locked rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn router_exposes_the_full_interview_lifecycle() {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use intake_ai::assessment::assessment_router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    let (service, _) = build_service();
    let router = assessment_router(Arc::new(service));

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/assessments")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "user_id": "patient-7" }).to_string()))
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    let created: Value = serde_json::from_slice(&body).expect("json payload");
    let session_id = created["session_id"].as_str().expect("session id").to_string();

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/assessments/{session_id}/patient-messages"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "text": "I have sharp ear pain, in detail." }).to_string(),
                ))
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v1/assessments/{session_id}/progress"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    let progress: Value = serde_json::from_slice(&body).expect("json payload");
    assert_eq!(progress["message_count"], 1);
    assert_eq!(progress["locked"], false);
}
