//! Section API integration tests.

mod helpers;

use helpers::{api_path, create_intake, intake_body, setup_test_app};
use serde_json::{json, Value};

#[tokio::test]
async fn test_upsert_is_idempotent() {
    let app = setup_test_app();
    let client = app.client();
    let intake_id = create_intake(client, intake_body("Acme")).await;
    let path = api_path(&format!("/intakes/{}/sections/D", intake_id));
    let payload = json!({"changeDescription": "New dental carrier"});

    let first = client.put(&path).json(&payload).await;
    assert_eq!(first.status_code(), 200);
    assert_eq!(first.json::<Value>(), json!({"updated": false}));

    let second = client.put(&path).json(&payload).await;
    assert_eq!(second.json::<Value>(), json!({"updated": true}));

    let sections = client
        .get(&api_path(&format!("/intakes/{}/sections", intake_id)))
        .await
        .json::<Vec<Value>>();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0]["sectionCode"], "D");
    assert_eq!(sections[0]["payload"]["changeDescription"], "New dental carrier");
}

#[tokio::test]
async fn test_bulk_create_skips_existing() {
    let app = setup_test_app();
    let client = app.client();
    let intake_id = create_intake(client, intake_body("Acme")).await;

    client
        .put(&api_path(&format!("/intakes/{}/sections/A", intake_id)))
        .json(&json!({"changeDescription": "original"}))
        .await;

    let res = client
        .post(&api_path(&format!("/intakes/{}/sections/bulk", intake_id)))
        .json(&json!({
            "sections": [
                {"sectionCode": "A", "payload": {"changeDescription": "replacement"}},
                {"sectionCode": "B"}
            ]
        }))
        .await;
    assert_eq!(res.status_code(), 200);
    let results: Vec<Value> = res.json();
    assert_eq!(results[0]["sectionCode"], "A");
    assert_eq!(results[0]["created"], false);
    assert_eq!(results[1]["sectionCode"], "B");
    assert_eq!(results[1]["created"], true);

    let a = client
        .get(&api_path(&format!("/intakes/{}/sections/A", intake_id)))
        .await
        .json::<Value>();
    assert_eq!(a["payload"]["changeDescription"], "original");
}

#[tokio::test]
async fn test_create_single_section() {
    let app = setup_test_app();
    let client = app.client();
    let intake_id = create_intake(client, intake_body("Acme")).await;
    let path = api_path(&format!("/intakes/{}/sections", intake_id));
    let body = json!({"sectionCode": "Q", "payload": {"changeDescription": "Add EAP"}});

    let created = client.post(&path).json(&body).await;
    assert_eq!(created.status_code(), 201);
    let existing = client.post(&path).json(&body).await;
    assert_eq!(existing.status_code(), 200);
    assert_eq!(existing.json::<Value>()["created"], false);
}

#[tokio::test]
async fn test_sections_of_missing_intake() {
    let app = setup_test_app();
    let client = app.client();

    let list = client.get(&api_path("/intakes/EG-2026-0000/sections")).await;
    assert_eq!(list.status_code(), 404);

    let upsert = client
        .put(&api_path("/intakes/EG-2026-0000/sections/A"))
        .json(&json!({}))
        .await;
    assert_eq!(upsert.status_code(), 404);
}

#[tokio::test]
async fn test_delete_section() {
    let app = setup_test_app();
    let client = app.client();
    let intake_id = create_intake(client, intake_body("Acme")).await;
    let path = api_path(&format!("/intakes/{}/sections/F", intake_id));

    client.put(&path).json(&json!({})).await;
    assert_eq!(client.delete(&path).await.status_code(), 204);
    assert_eq!(client.delete(&path).await.status_code(), 404);
    assert_eq!(client.get(&path).await.status_code(), 404);

    let bad = client
        .delete(&api_path(&format!("/intakes/{}/sections/a", intake_id)))
        .await;
    assert_eq!(bad.status_code(), 400);
}

#[tokio::test]
async fn test_delete_intake_removes_sections() {
    let app = setup_test_app();
    let client = app.client();
    let intake_id = create_intake(client, intake_body("Acme")).await;

    for code in ["A", "B", "C"] {
        client
            .put(&api_path(&format!("/intakes/{}/sections/{}", intake_id, code)))
            .json(&json!({"changeDescription": code}))
            .await;
    }
    client
        .delete(&api_path(&format!("/intakes/{}", intake_id)))
        .await;

    let remaining = app
        .state
        .intakes
        .sections()
        .get_by_intake(&intake_id)
        .await
        .unwrap();
    assert!(remaining.is_empty());
}
