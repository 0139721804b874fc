//! End-to-end HTTP flow over the assembled API scope with fixture adapters:
//! register, log in, browse, fill the cart, check out, list and cancel
//! tickets, with stock visible at every step.

mod support;

use actix_web::cookie::{Cookie, Key};
use actix_web::http::StatusCode;
use actix_web::{App, test};
use serde_json::{Value, json};

use backend::server::api_scope;

use support::{StateHarness, game, state_harness};

async fn login_cookie<S, B>(app: &S, username: &str) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
{
    let register = test::TestRequest::post()
        .uri("/api/v1/register")
        .set_json(json!({ "username": username, "password": "correct horse" }))
        .to_request();
    let res = test::call_service(app, register).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let login = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "username": username, "password": "correct horse" }))
        .to_request();
    let res = test::call_service(app, login).await;
    assert_eq!(res.status(), StatusCode::OK);
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

async fn json_body(res: actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>) -> Value {
    serde_json::from_slice(&test::read_body(res).await).expect("json body")
}

fn remaining_for(listing: &Value, match_id: &str) -> u64 {
    listing
        .as_array()
        .expect("array body")
        .iter()
        .find(|m| m.get("id").and_then(Value::as_str) == Some(match_id))
        .and_then(|m| m.get("remaining"))
        .and_then(Value::as_u64)
        .expect("remaining present")
}

#[actix_web::test]
async fn full_purchase_and_cancellation_flow() {
    let contested = game(2);
    let h: StateHarness = state_harness(vec![contested.clone()]);
    let app = test::init_service(
        App::new().service(api_scope(h.state.clone(), Key::generate(), false)),
    )
    .await;
    let match_id = contested.id().to_string();

    let cookie = login_cookie(&app, "alice").await;

    // Browse: full stock.
    let res =
        test::call_service(&app, test::TestRequest::get().uri("/api/v1/matches").to_request())
            .await;
    assert_eq!(res.status(), StatusCode::OK);
    let listing = json_body(res).await;
    assert_eq!(remaining_for(&listing, &match_id), 2);

    // Fill the cart and check out.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/cart/{match_id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/checkout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body.get("status").and_then(Value::as_str), Some("success"));
    let booking_ids = body
        .get("bookingIds")
        .and_then(Value::as_array)
        .expect("booking ids");
    assert_eq!(booking_ids.len(), 1);
    let booking_id = booking_ids[0].as_str().expect("booking id string").to_owned();

    // Stock reflects the purchase.
    let res =
        test::call_service(&app, test::TestRequest::get().uri("/api/v1/matches").to_request())
            .await;
    let listing = json_body(res).await;
    assert_eq!(remaining_for(&listing, &match_id), 1);

    // Ticket listing shows the PAID booking.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/tickets")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let tickets = json_body(res).await;
    let tickets = tickets.as_array().expect("array body");
    assert_eq!(tickets.len(), 1);
    assert_eq!(
        tickets[0].get("status").and_then(Value::as_str),
        Some("paid")
    );

    // Cancelling returns the seat to stock.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/tickets/{booking_id}/cancel"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res =
        test::call_service(&app, test::TestRequest::get().uri("/api/v1/matches").to_request())
            .await;
    let listing = json_body(res).await;
    assert_eq!(remaining_for(&listing, &match_id), 2);

    // Cancelling twice conflicts.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/tickets/{booking_id}/cancel"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn checkout_reports_sold_out_matches_by_id() {
    let gone = game(0);
    let h = state_harness(vec![gone.clone()]);
    let app = test::init_service(
        App::new().service(api_scope(h.state.clone(), Key::generate(), false)),
    )
    .await;
    let cookie = login_cookie(&app, "bob").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/cart/{}", gone.id()))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK, "carting a sold-out match is allowed");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/checkout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(
        body.get("status").and_then(Value::as_str),
        Some("out_of_stock")
    );
    assert_eq!(
        body.get("matchIds").and_then(Value::as_array).map(Vec::len),
        Some(1)
    );
}

#[actix_web::test]
async fn protected_endpoints_reject_anonymous_requests() {
    let h = state_harness(vec![game(1)]);
    let app = test::init_service(
        App::new().service(api_scope(h.state.clone(), Key::generate(), false)),
    )
    .await;

    for uri in ["/api/v1/cart", "/api/v1/tickets"] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "GET {uri}");
        let body = json_body(res).await;
        assert_eq!(
            body.get("code").and_then(Value::as_str),
            Some("unauthorized")
        );
    }

    let res = test::call_service(
        &app,
        test::TestRequest::post().uri("/api/v1/checkout").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
