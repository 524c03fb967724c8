use crate::router::respond;
use crate::tests::utils::{body_string, request, sign_in, test_app};
use astra::Body;
use http::Method;

#[test]
fn home_page_renders_for_guests_and_users() {
    let (_dir, app) = test_app();

    let resp = respond(request(Method::GET, "/", None, Body::empty()), &app);
    assert_eq!(resp.status(), 200);

    let (_, token) = sign_in(&app, "agent@example.com");
    let resp = respond(request(Method::GET, "/import", Some(&token), Body::empty()), &app);
    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains("agent@example.com"));
    assert!(body.contains("multipart/form-data"));
}

#[test]
fn import_page_lists_accepted_values() {
    let (_dir, app) = test_app();

    let body = body_string(respond(request(Method::GET, "/import", None, Body::empty()), &app));
    assert!(body.contains("<code>propertyType</code>"));
    assert!(body.contains("<code>ZeroToThree</code> (0-3 months)"));
    assert!(body.contains("<code>WalkIn</code> (Walk-in)"));
    assert!(body.contains("<code>Negotiation</code>"));
}

#[test]
fn unknown_page_is_an_html_404() {
    let (_dir, app) = test_app();

    let resp = respond(request(Method::GET, "/nowhere", None, Body::empty()), &app);
    assert_eq!(resp.status(), 404);
    let content_type = resp.headers().get("Content-Type").unwrap().to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    assert!(body_string(resp).contains("Not found"));
}
