use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::{json, Value};

use super::auth;
use crate::{errors::ServerError, service::NoteService, AppState};

/// Positional arguments of a method call. An empty body means no arguments.
fn parse_args(body: &[u8]) -> Result<Vec<Value>, ServerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    match serde_json::from_slice(body) {
        Ok(Value::Array(args)) => Ok(args),
        Ok(_) => Err(ServerError::invalid_argument(
            "method arguments must be a JSON array",
        )),
        Err(e) => Err(ServerError::invalid_argument(format!(
            "malformed arguments: {e}"
        ))),
    }
}

pub async fn call(
    req: HttpRequest,
    method: web::Path<String>,
    body: web::Bytes,
    env: web::Data<AppState>,
    service: web::Data<NoteService>,
) -> Result<HttpResponse, ServerError> {
    let caller = auth::caller(&req, &env);
    let args = parse_args(&body)?;

    match method.as_str() {
        "notes.insert" => {
            let id = service.create(&caller, args.first())?;
            Ok(HttpResponse::Created().json(json!({ "id": id })))
        }
        "notes.remove" => {
            service.remove(&caller, args.first())?;
            Ok(HttpResponse::Ok().json(json!({})))
        }
        "notes.update" => {
            service.update(&caller, args.first(), args.get(1))?;
            Ok(HttpResponse::Ok().json(json!({})))
        }
        other => Err(ServerError::UnknownMethod(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{self, auth::tests::token_for};
    use crate::models::note::Note;
    use crate::store::{MemoryNoteStore, NoteStore};
    use actix_web::{http::StatusCode, test, App};
    use std::sync::Arc;

    fn seed() -> Arc<MemoryNoteStore> {
        let store = Arc::new(MemoryNoteStore::new());
        store
            .insert(Note {
                id: "n1".into(),
                title: "My Title".into(),
                body: "My Body".into(),
                updated_at: 0,
                owner_id: "u1".into(),
            })
            .unwrap();
        store
    }

    macro_rules! app {
        ($store:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState::new(
                        auth::tests::SECRET.to_string(),
                    )))
                    .app_data(web::Data::new(NoteService::new($store.clone())))
                    .configure(handlers::config),
            )
            .await
        };
    }

    fn call_as(user: Option<&str>, method: &str, args: Value) -> test::TestRequest {
        let mut req = test::TestRequest::post()
            .uri(&format!("/methods/{method}"))
            .set_json(args);
        if let Some(user) = user {
            req = req.insert_header(("Authorization", format!("Bearer {}", token_for(user))));
        }
        req
    }

    #[actix_web::test]
    async fn empty_body_means_no_arguments() {
        assert!(parse_args(b"").unwrap().is_empty());
        assert!(parse_args(b"  \n").unwrap().is_empty());
        assert_eq!(parse_args(b"[\"n1\"]").unwrap(), vec![json!("n1")]);
        assert!(parse_args(b"{\"id\":1}").is_err());
        assert!(parse_args(b"[").is_err());
    }

    #[actix_web::test]
    async fn insert_returns_new_id() {
        let store = seed();
        let app = app!(store);

        let resp = test::call_service(
            &app,
            call_as(Some("u2"), "notes.insert", json!([{ "title": "t" }])).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        let id = body["id"].as_str().unwrap();
        let note = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(note.owner_id, "u2");
        assert_eq!(note.title, "t");
    }

    #[actix_web::test]
    async fn insert_without_token_is_unauthorized() {
        let store = seed();
        let app = app!(store);

        let resp =
            test::call_service(&app, call_as(None, "notes.insert", json!([])).to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(store.find_by_owner("").unwrap().is_empty());
    }

    #[actix_web::test]
    async fn remove_with_numeric_id_is_bad_request() {
        let store = seed();
        let app = app!(store);

        let resp = test::call_service(
            &app,
            call_as(Some("u1"), "notes.remove", json!([0])).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(store.find_by_id("n1").unwrap().is_some());
    }

    #[actix_web::test]
    async fn missing_and_foreign_notes_answer_differently() {
        let store = seed();
        let app = app!(store);

        let missing = test::call_service(
            &app,
            call_as(Some("u2"), "notes.remove", json!(["nope"])).to_request(),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let foreign = test::call_service(
            &app,
            call_as(Some("u2"), "notes.remove", json!(["n1"])).to_request(),
        )
        .await;
        assert_eq!(foreign.status(), StatusCode::OK);
        assert!(store.find_by_id("n1").unwrap().is_some());
    }

    #[actix_web::test]
    async fn update_with_extra_field_is_bad_request() {
        let store = seed();
        let app = app!(store);

        let resp = test::call_service(
            &app,
            call_as(
                Some("u1"),
                "notes.update",
                json!(["n1", { "footer": "Show me the footah!!" }]),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.find_by_id("n1").unwrap().unwrap().updated_at, 0);
    }

    #[actix_web::test]
    async fn update_by_owner_changes_title() {
        let store = seed();
        let app = app!(store);

        let resp = test::call_service(
            &app,
            call_as(Some("u1"), "notes.update", json!(["n1", { "title": "X" }])).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let note = store.find_by_id("n1").unwrap().unwrap();
        assert_eq!(note.title, "X");
        assert_eq!(note.body, "My Body");
        assert!(note.updated_at > 0);
    }

    #[actix_web::test]
    async fn unknown_method_is_not_found() {
        let store = seed();
        let app = app!(store);

        let resp = test::call_service(
            &app,
            call_as(Some("u1"), "notes.archive", json!(["n1"])).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
