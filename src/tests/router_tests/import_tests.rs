// src/tests/router_tests/import_tests.rs

use crate::db::buyers::count_buyers;
use crate::router::respond;
use crate::tests::utils::{body_json, body_string, json_request, request, sign_in, test_app, upload_request};
use astra::Body;
use http::Method;
use serde_json::json;

fn rows(n: usize) -> String {
    let mut text = String::from("fullName,phone\n");
    for i in 0..n {
        text.push_str(&format!("Lead {i},91234{:05}\n", i));
    }
    text
}

fn stored_buyers(app: &crate::router::App) -> i64 {
    app.db.with_conn(|conn| Ok(count_buyers(conn)?)).unwrap()
}

#[test]
fn minimal_file_imports_one_buyer_with_history() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    let req = upload_request(
        "/api/import",
        Some(&token),
        "leads.csv",
        "text/csv",
        "fullName,phone\nJane Doe,9999999999",
    );
    let resp = respond(req, &app);
    assert_eq!(resp.status(), 200);

    let report = body_json(resp);
    assert_eq!(report["importedCount"], 1);
    assert_eq!(report["skippedCount"], 0);
    assert_eq!(report["message"], "Imported 1 of 1 records successfully");
    assert_eq!(report["imported"][0]["row"], 2);
    assert_eq!(report["imported"][0]["success"], true);

    let id = report["imported"][0]["id"].as_str().unwrap().to_string();
    let resp = respond(
        request(Method::GET, &format!("/api/buyers/{id}/history"), Some(&token), Body::empty()),
        &app,
    );
    assert_eq!(resp.status(), 200);
    let history = body_json(resp);
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "IMPORT");
    assert_eq!(entries[0]["diff"]["phone"], "9999999999");
    assert_eq!(entries[0]["changedBy"]["email"], "agent@example.com");
}

#[test]
fn more_than_200_rows_is_rejected() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    let req = upload_request("/api/import", Some(&token), "big.csv", "text/csv", &rows(201));
    let resp = respond(req, &app);
    assert_eq!(resp.status(), 400);
    assert_eq!(body_json(resp)["error"], "File contains more than 200 rows");
    assert_eq!(stored_buyers(&app), 0);
}

#[test]
fn exactly_200_rows_is_accepted() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    let req = upload_request("/api/import", Some(&token), "big.csv", "text/csv", &rows(200));
    let report = body_json(respond(req, &app));
    assert_eq!(report["importedCount"], 200);
    assert_eq!(stored_buyers(&app), 200);
}

#[test]
fn invalid_row_rejects_the_whole_file() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    let csv = "fullName,phone,email\nGood Row,9999999999,\nBad Row,12345,not-an-email\n";
    let resp = respond(
        upload_request("/api/import", Some(&token), "leads.csv", "text/csv", csv),
        &app,
    );
    assert_eq!(resp.status(), 400);

    let body = body_json(resp);
    assert_eq!(body["message"], "1 records failed validation");
    assert_eq!(body["errors"][0]["row"], 3);
    assert_eq!(body["errors"][0]["valid"], false);
    assert_eq!(
        body["errors"][0]["errors"],
        json!(["phone: Phone must be 10-15 digits", "email: Invalid email address"])
    );
    assert_eq!(stored_buyers(&app), 0);
}

#[test]
fn missing_required_columns_are_a_row_error() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    let resp = respond(
        upload_request("/api/import", Some(&token), "leads.csv", "text/csv", "fullName,city\nNo Phone,Mohali\n"),
        &app,
    );
    let body = body_json(resp);
    assert_eq!(
        body["errors"][0]["errors"][0],
        "Missing required fields: fullName and phone are required"
    );
}

#[test]
fn duplicate_phone_within_file_is_skipped() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    let csv = "fullName,phone\nFirst Lead,9999999999\nSecond Lead,99999-99999\n";
    let report = body_json(respond(
        upload_request("/api/import", Some(&token), "leads.csv", "text/csv", csv),
        &app,
    ));

    assert_eq!(report["importedCount"], 1);
    assert_eq!(report["skippedCount"], 1);
    assert_eq!(report["imported"][0]["fullName"], "First Lead");
    assert_eq!(report["failed"][0]["fullName"], "Second Lead");
    assert_eq!(report["failed"][0]["success"], false);
    assert_eq!(report["failed"][0]["error"], "Duplicate phone number within this file");
}

#[test]
fn phone_already_stored_is_skipped() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    let existing = json!({
        "fullName": "Existing Lead",
        "phone": "9999999999",
        "city": "Mohali",
        "propertyType": "Plot",
        "purpose": "Buy",
        "timeline": "Exploring",
        "source": "Call"
    });
    let created = respond(json_request(Method::POST, "/api/buyers", &token, &existing), &app);
    assert_eq!(created.status(), 201);

    let report = body_json(respond(
        upload_request(
            "/api/import",
            Some(&token),
            "leads.csv",
            "text/csv",
            "fullName,phone,city\nImported Lead,9999999999,Chandigarh\n",
        ),
        &app,
    ));
    assert_eq!(report["importedCount"], 0);
    assert_eq!(report["failed"][0]["error"], "Phone number already exists");

    let list = body_json(respond(
        request(Method::GET, "/api/buyers", Some(&token), Body::empty()),
        &app,
    ));
    assert_eq!(list["buyers"][0]["fullName"], "Existing Lead");
    assert_eq!(list["buyers"][0]["city"], "Mohali");
    assert_eq!(list["pagination"]["total"], 1);
}

#[test]
fn import_requires_a_session() {
    let (_dir, app) = test_app();

    let resp = respond(
        upload_request("/api/import", None, "leads.csv", "text/csv", "fullName,phone\nJane Doe,9999999999"),
        &app,
    );
    assert_eq!(resp.status(), 401);
    assert_eq!(body_json(resp)["error"], "Unauthorized");
    assert_eq!(stored_buyers(&app), 0);
}

#[test]
fn file_type_is_checked_by_mime_or_name() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    let resp = respond(
        upload_request("/api/import", Some(&token), "notes.txt", "text/plain", "fullName,phone\nJane Doe,9999999999"),
        &app,
    );
    assert_eq!(resp.status(), 400);
    assert_eq!(body_json(resp)["error"], "Only CSV or Excel files are supported");

    let resp = respond(
        upload_request(
            "/api/import",
            Some(&token),
            "export.CSV",
            "application/octet-stream",
            "fullName,phone\nJane Doe,9999999999",
        ),
        &app,
    );
    assert_eq!(resp.status(), 200);
}

#[test]
fn structural_errors() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    let resp = respond(
        upload_request("/api/import", Some(&token), "empty.csv", "text/csv", "   "),
        &app,
    );
    assert_eq!(body_json(resp)["error"], "File is empty");

    let resp = respond(
        upload_request("/api/import", Some(&token), "header.csv", "text/csv", "fullName,phone"),
        &app,
    );
    assert_eq!(body_json(resp)["error"], "No data found in CSV file");

    let resp = respond(
        upload_request("/api/import", Some(&token), "ragged.csv", "text/csv", "fullName,phone\na,b,c"),
        &app,
    );
    assert_eq!(
        body_json(resp)["error"],
        "Invalid CSV format. Please check your file structure."
    );

    let resp = respond(
        json_request(Method::POST, "/api/import", &token, &json!({})),
        &app,
    );
    assert_eq!(resp.status(), 400);
    assert_eq!(body_json(resp)["error"], "No file provided");
}

#[test]
fn template_download() {
    let (_dir, app) = test_app();

    let resp = respond(
        request(Method::GET, "/api/import/template", None, Body::empty()),
        &app,
    );
    assert_eq!(resp.status(), 200);
    let disposition = resp
        .headers()
        .get("Content-Disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("buyers-import-template.csv"));

    let body = body_string(resp);
    assert!(body.starts_with(
        "fullName,email,phone,city,propertyType,bhk,purpose,budgetMin,budgetMax,timeline,source,status,notes,tags"
    ));
    assert!(body.contains("John Doe"));
}

#[test]
fn html_upload_renders_the_report() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    let resp = respond(
        upload_request("/import", Some(&token), "leads.csv", "text/csv", "fullName,phone\nJane Doe,9999999999\nJohn Roe,9999999999"),
        &app,
    );
    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains("Imported 1 of 2 records successfully"));
    assert!(body.contains("Duplicate phone number within this file"));
}
