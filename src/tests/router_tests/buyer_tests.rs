// src/tests/router_tests/buyer_tests.rs

use crate::router::respond;
use crate::tests::utils::{body_json, body_string, json_request, request, sign_in, test_app};
use astra::Body;
use http::Method;
use serde_json::{json, Value};

fn lead(name: &str, phone: &str) -> Value {
    json!({
        "fullName": name,
        "phone": phone,
        "city": "Mohali",
        "propertyType": "Plot",
        "purpose": "Buy",
        "timeline": "Exploring",
        "source": "Website",
        "tags": ["hot", "hot", "nri"]
    })
}

fn get(uri: &str, token: &str) -> astra::Request {
    request(Method::GET, uri, Some(token), Body::empty())
}

#[test]
fn create_returns_the_buyer_and_records_history() {
    let (_dir, app) = test_app();
    let (user_id, token) = sign_in(&app, "agent@example.com");

    let resp = respond(
        json_request(Method::POST, "/api/buyers", &token, &lead("Asha Verma", "9876543210")),
        &app,
    );
    assert_eq!(resp.status(), 201);
    let buyer = body_json(resp);
    assert_eq!(buyer["fullName"], "Asha Verma");
    assert_eq!(buyer["status"], "New");
    assert_eq!(buyer["ownerId"], user_id);
    assert_eq!(buyer["tags"], json!(["hot", "nri"]));

    let id = buyer["id"].as_str().unwrap();
    let detail = body_json(respond(get(&format!("/api/buyers/{id}"), &token), &app));
    assert_eq!(detail["owner"]["email"], "agent@example.com");
    assert_eq!(detail["history"][0]["action"], "CREATE");
    assert_eq!(detail["history"][0]["diff"]["fullName"]["old"], Value::Null);
    assert_eq!(detail["history"][0]["diff"]["fullName"]["new"], "Asha Verma");
}

#[test]
fn create_rejects_a_taken_phone() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    let first = respond(
        json_request(Method::POST, "/api/buyers", &token, &lead("Asha Verma", "9876543210")),
        &app,
    );
    assert_eq!(first.status(), 201);

    let second = respond(
        json_request(Method::POST, "/api/buyers", &token, &lead("Ravi Kumar", "9876543210")),
        &app,
    );
    assert_eq!(second.status(), 400);
    assert_eq!(body_json(second)["error"], "A buyer with this phone number already exists");
}

#[test]
fn create_reports_field_errors() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    let mut body = lead("Asha Verma", "9876543210");
    body["propertyType"] = json!("Apartment");
    let resp = respond(json_request(Method::POST, "/api/buyers", &token, &body), &app);
    assert_eq!(resp.status(), 400);

    let body = body_json(resp);
    assert_eq!(body["error"], "Invalid data");
    assert_eq!(body["details"][0]["path"], json!(["bhk"]));
}

#[test]
fn updates_only_record_real_changes() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    let body = lead("Asha Verma", "9876543210");
    let buyer = body_json(respond(json_request(Method::POST, "/api/buyers", &token, &body), &app));
    let id = buyer["id"].as_str().unwrap().to_string();
    let uri = format!("/api/buyers/{id}");
    let history_uri = format!("/api/buyers/{id}/history");

    let resp = respond(json_request(Method::PUT, &uri, &token, &body), &app);
    assert_eq!(resp.status(), 200);
    let history = body_json(respond(get(&history_uri, &token), &app));
    assert_eq!(history.as_array().unwrap().len(), 1);

    let mut changed = body.clone();
    changed["status"] = json!("Contacted");
    let resp = respond(json_request(Method::PUT, &uri, &token, &changed), &app);
    assert_eq!(body_json(resp)["status"], "Contacted");

    let history = body_json(respond(get(&history_uri, &token), &app));
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["action"], "UPDATE");
    assert_eq!(entries[0]["diff"], json!({ "status": { "old": "New", "new": "Contacted" } }));
    assert_eq!(entries[1]["action"], "CREATE");
}

#[test]
fn delete_then_lookups_are_not_found() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    let buyer = body_json(respond(
        json_request(Method::POST, "/api/buyers", &token, &lead("Asha Verma", "9876543210")),
        &app,
    ));
    let uri = format!("/api/buyers/{}", buyer["id"].as_str().unwrap());

    let resp = respond(request(Method::DELETE, &uri, Some(&token), Body::empty()), &app);
    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(resp)["message"], "Buyer deleted successfully");

    let resp = respond(get(&uri, &token), &app);
    assert_eq!(resp.status(), 404);
    assert_eq!(body_json(resp)["error"], "Not found");

    let resp = respond(get(&format!("{uri}/history"), &token), &app);
    assert_eq!(resp.status(), 404);

    let resp = respond(request(Method::DELETE, &uri, Some(&token), Body::empty()), &app);
    assert_eq!(resp.status(), 404);
}

#[test]
fn list_filters_and_paginates() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    for (name, phone) in [
        ("Asha Verma", "9876543210"),
        ("Ravi Kumar", "9876543211"),
        ("Meena Gill", "9876543212"),
    ] {
        respond(json_request(Method::POST, "/api/buyers", &token, &lead(name, phone)), &app);
    }
    let mut other_city = lead("Karan Sethi", "9876543213");
    other_city["city"] = json!("Panchkula");
    respond(json_request(Method::POST, "/api/buyers", &token, &other_city), &app);

    let page = body_json(respond(get("/api/buyers?limit=2&page=2", &token), &app));
    assert_eq!(page["buyers"].as_array().unwrap().len(), 2);
    assert_eq!(page["pagination"], json!({ "page": 2, "limit": 2, "total": 4, "pages": 2 }));

    let page = body_json(respond(get("/api/buyers?city=Panchkula", &token), &app));
    assert_eq!(page["pagination"]["total"], 1);
    assert_eq!(page["buyers"][0]["fullName"], "Karan Sethi");
    assert_eq!(page["buyers"][0]["owner"]["email"], "agent@example.com");

    let page = body_json(respond(get("/api/buyers?search=ravi", &token), &app));
    assert_eq!(page["pagination"]["total"], 1);

    let resp = respond(get("/api/buyers?city=Atlantis", &token), &app);
    assert_eq!(resp.status(), 400);
}

#[test]
fn export_csv_uses_import_columns() {
    let (_dir, app) = test_app();
    let (_, token) = sign_in(&app, "agent@example.com");

    respond(
        json_request(Method::POST, "/api/buyers", &token, &lead("Asha Verma", "9876543210")),
        &app,
    );

    let resp = respond(get("/api/export", &token), &app);
    assert_eq!(resp.status(), 200);
    let disposition = resp
        .headers()
        .get("Content-Disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("buyers-export-"));
    assert!(disposition.contains(".csv"));

    let body = body_string(resp);
    let mut lines = body.lines();
    assert!(lines.next().unwrap().starts_with("fullName,email,phone,city,"));
    assert!(lines.next().unwrap().starts_with("Asha Verma,,9876543210,Mohali,Plot,"));
    assert_eq!(lines.next(), None);
}

#[test]
fn buyer_routes_require_a_session() {
    let (_dir, app) = test_app();

    let resp = respond(request(Method::GET, "/api/buyers", None, Body::empty()), &app);
    assert_eq!(resp.status(), 401);
    assert_eq!(body_json(resp)["error"], "Unauthorized");

    let resp = respond(request(Method::GET, "/api/export", Some("bogus"), Body::empty()), &app);
    assert_eq!(resp.status(), 401);
}
