use crate::config::{AppConfig, AppState};
use crate::routes;
use crate::utils::blob_store::MemoryBlobStore;
use crate::utils::document_store::MemoryDocumentStore;
use crate::utils::{USER_ID_HEADER, USER_NAME_HEADER};
use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

fn app_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(
        Arc::new(MemoryDocumentStore::new()),
        Arc::new(MemoryBlobStore::new("http://test")),
        AppConfig::default(),
    ))
}

fn as_user(req: test::TestRequest, user_id: &str) -> test::TestRequest {
    req.insert_header((USER_ID_HEADER, user_id))
        .insert_header((USER_NAME_HEADER, format!("{} name", user_id)))
}

fn event_body() -> Value {
    json!({
        "name": "Houston Championship",
        "location": "Houston",
        "startDate": "2025-04-16",
        "endDate": "2025-04-19"
    })
}

#[actix_rt::test]
async fn requests_without_identity_are_unauthorized() {
    let app = test::init_service(App::new().app_data(app_state()).configure(routes::init_routes)).await;

    let req = test::TestRequest::get().uri("/events").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn roles_are_listed() {
    let app = test::init_service(App::new().app_data(app_state()).configure(routes::init_routes)).await;

    let req = as_user(test::TestRequest::get().uri("/roles"), "U1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let roles: Value = test::read_body_json(resp).await;
    assert_eq!(roles.as_array().map(Vec::len), Some(6));
}

#[actix_rt::test]
async fn sharing_flow_over_http() {
    let app = test::init_service(App::new().app_data(app_state()).configure(routes::init_routes)).await;

    let req = as_user(test::TestRequest::post().uri("/events"), "U1")
        .set_json(event_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let event: Value = test::read_body_json(resp).await;
    let event_id = event["id"].as_str().unwrap().to_string();
    assert_eq!(event["ownerId"], "U1");

    let req = as_user(
        test::TestRequest::post().uri(&format!("/events/{}/collaborators", event_id)),
        "U1",
    )
    .set_json(json!({ "userId": "U2", "userName": "Bob", "role": "viewer" }))
    .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = as_user(test::TestRequest::get().uri(&format!("/events/{}/role", event_id)), "U2")
        .to_request();
    let caps: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(caps["role"], "viewer");
    assert_eq!(caps["canEditData"], false);

    // Only admins manage sharing
    let req = as_user(
        test::TestRequest::post().uri(&format!("/events/{}/collaborators", event_id)),
        "U2",
    )
    .set_json(json!({ "userId": "U3", "userName": "Cy" }))
    .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = as_user(
        test::TestRequest::put().uri(&format!("/events/{}/collaborators/U2", event_id)),
        "U1",
    )
    .set_json(json!({ "role": "engineer" }))
    .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = as_user(test::TestRequest::get().uri(&format!("/events/{}/role", event_id)), "U2")
        .to_request();
    let caps: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(caps["role"], "engineer");
    assert_eq!(caps["canEditData"], true);
    assert_eq!(caps["checklists"], json!(["engineer"]));

    let req = as_user(
        test::TestRequest::delete().uri(&format!("/events/{}/collaborators/U2", event_id)),
        "U1",
    )
    .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = as_user(test::TestRequest::get().uri(&format!("/events/{}", event_id)), "U2")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Forbidden"));
}

#[actix_rt::test]
async fn stale_checklist_save_is_a_conflict() {
    let app = test::init_service(App::new().app_data(app_state()).configure(routes::init_routes)).await;

    let req = as_user(test::TestRequest::post().uri("/events"), "U1")
        .set_json(event_body())
        .to_request();
    let event: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let uri = format!("/events/{}/checklists/driver", event["id"].as_str().unwrap());

    let req = as_user(test::TestRequest::get().uri(&uri), "U1").to_request();
    let checklist: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(checklist["revision"], 0);
    assert_eq!(checklist["role"], "driver");

    let items = json!([{ "id": "a", "text": "Charge battery", "completed": false }]);
    let req = as_user(test::TestRequest::put().uri(&uri), "U1")
        .set_json(json!({ "items": items, "baseRevision": 0 }))
        .to_request();
    let saved: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(saved["revision"], 1);
    assert_eq!(saved["lastEditedBy"], "U1");

    let req = as_user(test::TestRequest::put().uri(&uri), "U1")
        .set_json(json!({ "items": [], "baseRevision": 0 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn unknown_checklist_scope_is_rejected() {
    let app = test::init_service(App::new().app_data(app_state()).configure(routes::init_routes)).await;

    let req = as_user(test::TestRequest::post().uri("/events"), "U1")
        .set_json(event_body())
        .to_request();
    let event: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let event_id = event["id"].as_str().unwrap();

    for scope in ["pilot", "viewer"] {
        let req = as_user(
            test::TestRequest::get().uri(&format!("/events/{}/checklists/{}", event_id, scope)),
            "U1",
        )
        .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_rt::test]
async fn pit_image_url_serves_the_uploaded_bytes() {
    let app = test::init_service(App::new().app_data(app_state()).configure(routes::init_routes)).await;

    let req = as_user(test::TestRequest::post().uri("/events"), "U1")
        .set_json(event_body())
        .to_request();
    let event: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let event_id = event["id"].as_str().unwrap().to_string();

    let req = as_user(
        test::TestRequest::post().uri(&format!("/events/{}/pit-scouts", event_id)),
        "U1",
    )
    .set_json(json!({ "teamNumber": 16236, "drivetrain": "swerve" }))
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let scout: Value = test::read_body_json(resp).await;
    let image_uri = format!(
        "/events/{}/pit-scouts/{}/image",
        event_id,
        scout["id"].as_str().unwrap()
    );

    let photo = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
    let req = as_user(test::TestRequest::post().uri(&image_uri), "U1")
        .set_payload(photo.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = as_user(test::TestRequest::get().uri(&image_uri), "U1").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let url = body["url"].as_str().unwrap();
    let blob_path = url.strip_prefix("http://test").unwrap().to_string();
    assert!(blob_path.starts_with("/blobs/pit_images/"));

    let req = test::TestRequest::get().uri(&blob_path).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = test::read_body(resp).await;
    assert_eq!(bytes.as_ref(), photo.as_slice());

    let req = test::TestRequest::get().uri("/blobs/pit_images/missing").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}
