//! End-to-end checks of `ApiClient`, `IntakeForm` and `StatusPoller` against
//! an in-process axum stand-in for the intake backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, RawQuery, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use intake_client::{
    ApiClient, ClientConfig, ClientError, IntakeForm, PatientQuery, PollEvent, StatusPoller,
    SubmitError, SubmitOutcome, run_indexing,
};
use intake_core::{IntakeField, Outcome, SelectedFile};
use serde_json::{Value, json};

#[derive(Default)]
struct Backend {
    fields: Vec<(String, String)>,
    files: Vec<(String, String, String, usize)>,
    status_calls: u32,
    retried: Vec<String>,
    list_query: Option<String>,
}

type Shared = Arc<Mutex<Backend>>;

async fn create_patient(
    State(backend): State<Shared>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut first_name = String::new();
    let mut documents = 0;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await.unwrap();
        {
            let mut b = backend.lock().unwrap();
            match file_name {
                Some(file_name) => {
                    documents += 1;
                    b.files.push((name, file_name, content_type, data.len()));
                }
                None => {
                    let value = String::from_utf8(data.to_vec()).unwrap();
                    if name == "first_name" {
                        first_name = value.clone();
                    }
                    b.fields.push((name, value));
                }
            }
        }
    }

    if first_name == "Reject" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "phone": ["A patient with this phone already exists."] })),
        );
    }

    let docs: Vec<Value> = (1..=documents)
        .map(|id| json!({ "id": id, "status": "pending" }))
        .collect();
    (
        StatusCode::CREATED,
        Json(json!({
            "patient_id": 42,
            "first_name": first_name,
            "last_name": "Diop",
            "documents": docs,
        })),
    )
}

async fn indexing_status(State(backend): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    assert_eq!(id, "42");
    let calls = {
        let mut b = backend.lock().unwrap();
        b.status_calls += 1;
        b.status_calls
    };
    if calls == 1 {
        Json(json!({
            "total_documents": 2, "indexed": 0, "processing": 1, "failed": 0,
            "pending": 1, "progress": 0, "is_complete": false,
            "documents": [
                { "id": 1, "filename": "scan.pdf", "status": "processing" },
                { "id": 2, "filename": "id.png", "status": "pending" }
            ]
        }))
    } else {
        Json(json!({
            "total_documents": 2, "indexed": 1, "processing": 0, "failed": 1,
            "pending": 0, "progress": 100, "is_complete": true,
            "documents": [
                { "id": 1, "filename": "scan.pdf", "status": "indexed" },
                { "id": 2, "filename": "id.png", "status": "failed", "error": "unreadable image" }
            ]
        }))
    }
}

async fn retry_document(
    State(backend): State<Shared>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    if id == "2" {
        backend.lock().unwrap().retried.push(id);
        (StatusCode::OK, Json(json!({ "status": "queued" })))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Document not found." })),
        )
    }
}

async fn list_patients(State(backend): State<Shared>, RawQuery(query): RawQuery) -> Json<Value> {
    backend.lock().unwrap().list_query = query;
    Json(json!({
        "results": [{
            "id": 42, "full_name": "Awa Diop", "phone": "+221771234567",
            "email": null, "is_active": false, "created_at": "2026-10-19T10:00:00Z",
            "activated_at": null, "documents_count": 2
        }],
        "total_count": 1, "page": 1, "page_size": 20,
        "has_next": false, "has_previous": false
    }))
}

async fn check_active(Json(body): Json<Value>) -> Json<Value> {
    if body["phone"] == "+221771234567" {
        Json(json!({
            "is_active": true, "patient_id": 42, "full_name": "Awa Diop",
            "activated_at": "2026-10-19T10:05:00Z"
        }))
    } else {
        Json(json!({ "is_active": false, "patient_id": null, "error": "Patient not found" }))
    }
}

async fn spawn_backend() -> (ApiClient, Shared) {
    let state = Shared::default();
    let app = Router::new()
        .route("/api/patients/", post(create_patient))
        .route("/api/patients/list/", get(list_patients))
        .route("/api/patients/check-active/", post(check_active))
        .route("/api/patients/{id}/indexing-status/", get(indexing_status))
        .route("/api/documents/{id}/retry/", post(retry_document))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClientConfig::new(format!("http://{addr}/"))
        .with_poll_interval(Duration::from_millis(20))
        .with_request_timeout(Duration::from_secs(5));
    (ApiClient::new(&config).unwrap(), state)
}

fn filled_form(first_name: &str) -> IntakeForm {
    let mut form = IntakeForm::new();
    form.set_field(IntakeField::FirstName, first_name);
    form.set_field(IntakeField::LastName, "Diop");
    form.set_field(IntakeField::Phone, "+221771234567");
    form.set_field(IntakeField::MedicalHistory, "asthma");
    form
}

#[tokio::test]
async fn submit_sends_multipart_and_hands_off_to_indexing() {
    let (client, backend) = spawn_backend().await;
    let mut form = filled_form("Awa");
    form.attach(vec![
        SelectedFile::new("scan.pdf", "application/pdf", b"%PDF-1.7 scan".to_vec()),
        SelectedFile::new("id.png", "image/png", vec![0x89, b'P', b'N', b'G']),
    ]);

    let outcome = form.submit(&client).await.unwrap();
    let SubmitOutcome::Indexing {
        patient_id,
        patient_name,
    } = outcome
    else {
        panic!("expected indexing hand-off");
    };
    assert_eq!(patient_id, "42");
    assert_eq!(patient_name, "Awa Diop");

    let b = backend.lock().unwrap();
    assert_eq!(b.fields.len(), 12);
    assert!(b.fields.contains(&("medical_history".into(), "asthma".into())));
    assert!(b.fields.contains(&("gender".into(), String::new())));
    assert_eq!(
        b.files,
        vec![
            (
                "documents".to_string(),
                "scan.pdf".to_string(),
                "application/pdf".to_string(),
                13
            ),
            (
                "documents".to_string(),
                "id.png".to_string(),
                "image/png".to_string(),
                4
            ),
        ]
    );
}

#[tokio::test]
async fn rejected_submission_surfaces_server_detail() {
    let (client, _backend) = spawn_backend().await;
    let mut form = filled_form("Reject");

    let err = form.submit(&client).await.unwrap_err();
    match err {
        SubmitError::Api(ClientError::Server { status, detail }) => {
            assert_eq!(status, 400);
            assert!(detail.contains("already exists"), "{detail}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(form.record().get(IntakeField::FirstName), "Reject");
}

#[tokio::test]
async fn poller_follows_indexing_and_retries_failures() {
    let (client, backend) = spawn_backend().await;
    let (mut poller, mut events) =
        StatusPoller::new(Arc::new(client), "42", Duration::from_millis(20));

    let mut snapshots = 0;
    let completion = run_indexing(&mut poller, &mut events, Some(Duration::from_secs(5)), |ev| {
        if matches!(ev, PollEvent::Snapshot(_)) {
            snapshots += 1;
        }
    })
    .await
    .unwrap();

    assert_eq!(snapshots, 2);
    assert_eq!(
        completion.outcome,
        Outcome::PartialSuccess {
            indexed: 1,
            failed: 1
        }
    );
    assert_eq!(
        completion.status.documents[1].error.as_deref(),
        Some("unreadable image")
    );

    let batch = poller.retry_failed().await;
    assert_eq!(batch.requested, 1);
    assert_eq!(batch.rejected, 0);
    assert_eq!(backend.lock().unwrap().retried, vec!["2".to_string()]);
    poller.deactivate();
}

#[tokio::test]
async fn retry_of_unknown_document_is_a_server_error() {
    let (client, _backend) = spawn_backend().await;
    let err = client.retry_document("99").await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 404, ref detail } if detail == "Document not found."));
}

#[tokio::test]
async fn list_and_check_active() {
    let (client, backend) = spawn_backend().await;

    let page = client
        .list_patients(&PatientQuery {
            search: Some("Diop".into()),
            is_active: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].documents_count, 2);
    assert_eq!(
        backend.lock().unwrap().list_query.as_deref(),
        Some("search=Diop&is_active=false")
    );

    let active = client.check_active("+221771234567").await.unwrap();
    assert!(active.is_active);
    assert_eq!(active.patient_id.as_deref(), Some("42"));

    let unknown = client.check_active("+10000000000").await.unwrap();
    assert!(!unknown.is_active);
    assert_eq!(unknown.error.as_deref(), Some("Patient not found"));
}
