//! Intake API integration tests.

mod helpers;

use guidedesk_core::config::RepositoryPolicy;
use guidedesk_core::StatusTransitionPolicy;
use helpers::{api_path, create_intake, intake_body, merge, setup_test_app, setup_test_app_with};
use serde_json::{json, Value};

#[tokio::test]
async fn test_create_and_get_intake() {
    let app = setup_test_app();
    let client = app.client();

    let body = merge(
        intake_body("Acme"),
        json!({
            "guideType": "NEW_GUIDE_BUILD",
            "sectionsChangedFlags": {"C": true, "D": true}
        }),
    );
    let intake_id = create_intake(client, body).await;
    assert!(intake_id.starts_with("EG-"));

    let res = client.get(&api_path(&format!("/intakes/{}", intake_id))).await;
    assert_eq!(res.status_code(), 200);
    let intake: Value = res.json();
    assert_eq!(intake["clientName"], "Acme");
    assert_eq!(intake["status"], "NOT_STARTED");
    assert_eq!(intake["complexityScore"], 17);
    assert_eq!(intake["complexityBand"], "High");
    assert_eq!(intake["sectionsChangedFlags"]["C"], true);
    assert_eq!(intake["sectionsChangedFlags"]["A"], false);
    assert_eq!(intake["sectionsIncludedFlags"]["Q"], true);
}

#[tokio::test]
async fn test_create_reports_field_errors() {
    let app = setup_test_app();
    let res = app
        .client()
        .post(&api_path("/intakes"))
        .json(&json!({
            "clientName": "  ",
            "payrollStorageUrl": "https://files.example.com",
            "planYear": 1990,
            "guideType": "NEW_GUIDE_BUILD",
            "communicationsAddOns": "NONE",
            "requestedProductionTime": "RUSH"
        }))
        .await;

    assert_eq!(res.status_code(), 400);
    let body: Value = res.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let field_errors = body["fieldErrors"].as_object().expect("fieldErrors");
    assert!(field_errors.contains_key("clientName"));
    assert!(field_errors.contains_key("requestorName"));
    assert!(field_errors.contains_key("planYear"));
    assert!(!field_errors.contains_key("guideType"));
}

#[tokio::test]
async fn test_create_rejects_unknown_enum() {
    let app = setup_test_app();
    let body = merge(
        intake_body("Acme"),
        json!({"guideType": "BRAND_NEW", "planYear": "2026", "requestorName": ""}),
    );
    let res = app.client().post(&api_path("/intakes")).json(&body).await;
    assert_eq!(res.status_code(), 400);
    let body: Value = res.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let field_errors = body["fieldErrors"].as_object().expect("fieldErrors");
    assert_eq!(field_errors["guideType"], "Invalid guide type: \"BRAND_NEW\"");
    assert_eq!(field_errors["planYear"], "Plan year must be an integer");
    assert!(field_errors.contains_key("requestorName"));
    assert!(!field_errors.contains_key("communicationsAddOns"));
}

#[tokio::test]
async fn test_get_missing_intake_is_404() {
    let app = setup_test_app();
    let res = app.client().get(&api_path("/intakes/EG-2026-ZZZZ")).await;
    assert_eq!(res.status_code(), 404);
    let body: Value = res.json();
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["error"], "Intake EG-2026-ZZZZ not found");
}

#[tokio::test]
async fn test_update_status() {
    let app = setup_test_app();
    let client = app.client();
    let intake_id = create_intake(client, intake_body("Acme")).await;

    let res = client
        .patch(&api_path(&format!("/intakes/{}/status", intake_id)))
        .json(&json!({"status": "READY_FOR_QA"}))
        .await;
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.json::<Value>(), json!({"success": true}));

    let bad = client
        .patch(&api_path(&format!("/intakes/{}/status", intake_id)))
        .json(&json!({"status": "DONE"}))
        .await;
    assert_eq!(bad.status_code(), 400);

    let missing = client
        .patch(&api_path("/intakes/EG-2000-0000/status"))
        .json(&json!({"status": "STARTED"}))
        .await;
    assert_eq!(missing.status_code(), 404);
}

#[tokio::test]
async fn test_workflow_policy_rejects_illegal_transition() {
    let mut config = helpers::test_config();
    config.repository = RepositoryPolicy {
        transition_policy: StatusTransitionPolicy::Workflow,
        ..RepositoryPolicy::default()
    };
    let app = setup_test_app_with(config);
    let client = app.client();
    let intake_id = create_intake(client, intake_body("Acme")).await;

    let res = client
        .patch(&api_path(&format!("/intakes/{}/status", intake_id)))
        .json(&json!({"status": "DELIVERED_TO_CONSULTANT"}))
        .await;
    assert_eq!(res.status_code(), 409);
    let body: Value = res.json();
    assert_eq!(body["code"], "ILLEGAL_STATUS_TRANSITION");
}

#[tokio::test]
async fn test_update_section_flags_recomputes_complexity() {
    let app = setup_test_app();
    let client = app.client();
    let intake_id = create_intake(client, intake_body("Acme")).await;

    let res = client
        .patch(&api_path(&format!("/intakes/{}/sections/B/flags", intake_id)))
        .json(&json!({"changed": true}))
        .await;
    assert_eq!(res.status_code(), 200);
    let body: Value = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["complexityScore"], 1);
    assert_eq!(body["complexityBand"], "Minimal");

    let included_only = client
        .patch(&api_path(&format!("/intakes/{}/sections/C/flags", intake_id)))
        .json(&json!({"included": false}))
        .await;
    assert_eq!(included_only.status_code(), 200);
    let body: Value = included_only.json();
    assert!(body.get("complexityScore").is_none());

    let bad_code = client
        .patch(&api_path(&format!("/intakes/{}/sections/R/flags", intake_id)))
        .json(&json!({"changed": true}))
        .await;
    assert_eq!(bad_code.status_code(), 400);

    let empty = client
        .patch(&api_path(&format!("/intakes/{}/sections/C/flags", intake_id)))
        .json(&json!({}))
        .await;
    assert_eq!(empty.status_code(), 400);
}

#[tokio::test]
async fn test_update_complexity_factors() {
    let app = setup_test_app();
    let client = app.client();
    let intake_id = create_intake(client, intake_body("Acme")).await;

    let res = client
        .patch(&api_path(&format!("/intakes/{}/complexity", intake_id)))
        .json(&json!({
            "sectionsChangedFlags": {"A": true, "B": true, "C": true},
            "communicationsAddOns": "OE_PRESENTATION"
        }))
        .await;
    assert_eq!(res.status_code(), 200);
    let body: Value = res.json();
    assert_eq!(body["score"], 8);
    assert_eq!(body["band"], "Low");
}

#[tokio::test]
async fn test_list_filters_and_sorts() {
    let app = setup_test_app();
    let client = app.client();

    let beta = create_intake(client, intake_body("beta")).await;
    let alpha = create_intake(client, intake_body("Alpha")).await;
    let rush = create_intake(
        client,
        merge(
            intake_body("gamma"),
            json!({"requestedProductionTime": "RUSH", "requestorName": "Sam Ortiz"}),
        ),
    )
    .await;

    client
        .patch(&api_path(&format!("/intakes/{}/status", beta)))
        .json(&json!({"status": "STARTED"}))
        .await;

    let res = client
        .get(&api_path("/intakes"))
        .add_query_param("sortBy", "clientName")
        .add_query_param("order", "asc")
        .await;
    assert_eq!(res.status_code(), 200);
    let names: Vec<String> = res
        .json::<Vec<Value>>()
        .iter()
        .map(|i| i["clientName"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["Alpha", "beta", "gamma"]);

    let started = client
        .get(&api_path("/intakes"))
        .add_query_param("status", r#"["STARTED"]"#)
        .await
        .json::<Vec<Value>>();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0]["intakeId"], beta.as_str());

    let rush_only = client
        .get(&api_path("/intakes"))
        .add_query_param("requestedProductionTime", "RUSH")
        .add_query_param("requestorName", "ortiz")
        .await
        .json::<Vec<Value>>();
    assert_eq!(rush_only.len(), 1);
    assert_eq!(rush_only[0]["intakeId"], rush.as_str());

    let not_started = client
        .get(&api_path("/intakes"))
        .add_query_param("status", "NOT_STARTED,ROADBLOCK")
        .await
        .json::<Vec<Value>>();
    let ids: Vec<&str> = not_started
        .iter()
        .filter_map(|i| i["intakeId"].as_str())
        .collect();
    assert!(ids.contains(&alpha.as_str()) && ids.contains(&rush.as_str()));
    assert_eq!(ids.len(), 2);

    let bad = client
        .get(&api_path("/intakes"))
        .add_query_param("complexityBand", "Huge")
        .await;
    assert_eq!(bad.status_code(), 400);

    let bad_sort = client
        .get(&api_path("/intakes"))
        .add_query_param("sortBy", "notesGeneral")
        .await;
    assert_eq!(bad_sort.status_code(), 400);
}

#[tokio::test]
async fn test_stats() {
    let app = setup_test_app();
    let client = app.client();
    create_intake(client, intake_body("Acme")).await;
    create_intake(
        client,
        merge(intake_body("Globex"), json!({"guideType": "NEW_GUIDE_BUILD", "sectionsChangedFlags": {"A": true}})),
    )
    .await;

    let res = client.get(&api_path("/intakes/stats")).await;
    assert_eq!(res.status_code(), 200);
    let stats: Value = res.json();
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["by_status"]["NOT_STARTED"], 2);
    assert_eq!(stats["by_status"]["DELIVERED_TO_CONSULTANT"], 0);
    assert_eq!(stats["by_complexity"]["Minimal"], 1);
    assert_eq!(stats["by_complexity"]["High"], 1);
    assert_eq!(stats["recent_count"], 2);
}

#[tokio::test]
async fn test_export_csv() {
    let app = setup_test_app();
    let client = app.client();
    create_intake(client, intake_body(r#"Acme, "The" Co."#)).await;
    create_intake(client, intake_body("Globex")).await;

    let res = client
        .get(&api_path("/intakes/export.csv"))
        .add_query_param("sortBy", "clientName")
        .add_query_param("order", "asc")
        .await;
    assert_eq!(res.status_code(), 200);

    let content_type = res.header("content-type");
    assert!(content_type.to_str().unwrap_or_default().starts_with("text/csv"));
    let disposition = res.header("content-disposition");
    let disposition = disposition.to_str().unwrap_or_default();
    assert!(disposition.starts_with("attachment; filename=\"intakes-"));
    assert!(disposition.ends_with(".csv\""));

    let text = res.text();
    assert!(text.contains(r#""Acme, ""The"" Co.""#));

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][1], r#"Acme, "The" Co."#);
    assert_eq!(&rows[1][1], "Globex");
}

#[tokio::test]
async fn test_delete_intake() {
    let app = setup_test_app();
    let client = app.client();
    let intake_id = create_intake(client, intake_body("Acme")).await;

    let res = client
        .delete(&api_path(&format!("/intakes/{}", intake_id)))
        .await;
    assert_eq!(res.status_code(), 204);

    let gone = client.get(&api_path(&format!("/intakes/{}", intake_id))).await;
    assert_eq!(gone.status_code(), 404);

    let again = client
        .delete(&api_path(&format!("/intakes/{}", intake_id)))
        .await;
    assert_eq!(again.status_code(), 404);
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = setup_test_app();
    let client = app.client();

    let health = client.get("/health").await;
    assert_eq!(health.status_code(), 200);
    let body: Value = health.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage_backend"], "memory");

    let spec = client.get("/api/openapi.json").await;
    assert_eq!(spec.status_code(), 200);
    let spec: Value = spec.json();
    assert!(spec["paths"]["/api/v0/intakes"].is_object());
}

#[tokio::test]
async fn test_request_id_header_is_set() {
    let app = setup_test_app();
    let res = app.client().get("/health").await;
    let request_id = res.header("x-request-id");
    assert!(!request_id.is_empty());
}
