use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use blackjack_server::{router, AppState, Config};
use clap::Parser;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let config = Config::parse_from([
        "blackjack-server",
        "--public-dir",
        "target/no-public-dir",
    ]);
    router(AppState::new(&config), &config)
}

struct Reply {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

async fn call(app: &Router, method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Reply {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply {
        status,
        cookie,
        body,
    }
}

async fn post_raw(app: &Router, uri: &str, cookie: &str, body: &'static str) -> Reply {
    let request = Request::post(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

async fn join(app: &Router, name: &str) -> String {
    let reply = call(app, Method::POST, "/api/init", None, Some(json!({ "name": name }))).await;
    assert_eq!(reply.status, StatusCode::OK);
    reply.cookie.expect("init should issue a session cookie")
}

#[tokio::test]
async fn healthz_responds() {
    let app = app();
    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn init_creates_player_and_cookie() {
    let app = app();
    let reply = call(&app, Method::POST, "/api/init", None, Some(json!({ "name": "Alice" }))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["name"], "Alice");
    assert_eq!(reply.body["balance"], 1000);
    let cookie = reply.cookie.unwrap();
    assert!(cookie.starts_with("session_id="));

    // Same cookie, same player; the new name is ignored.
    let again = call(&app, Method::POST, "/api/init", Some(&cookie), Some(json!({ "name": "Mallory" }))).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body["name"], "Alice");
    assert!(again.cookie.is_none());
}

#[tokio::test]
async fn init_without_body_uses_default_name() {
    let app = app();
    let reply = call(&app, Method::POST, "/api/init", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["name"], "Player");
}

#[tokio::test]
async fn unknown_cookie_gets_a_fresh_session() {
    let app = app();
    let reply = call(&app, Method::POST, "/api/init", Some("session_id=forged"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let cookie = reply.cookie.unwrap();
    assert_ne!(cookie, "session_id=forged");
}

#[tokio::test]
async fn game_calls_require_a_session() {
    let app = app();
    for uri in ["/api/new_round", "/api/hit", "/api/stand", "/api/redeem"] {
        let reply = call(&app, Method::POST, uri, None, Some(json!({ "bet": 10, "code": "bonus100" }))).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(reply.body["error"].as_str().unwrap().contains("no active session"));
    }
    let reply = call(&app, Method::GET, "/api/state", Some("session_id=nobody"), None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_bet_is_rejected_without_side_effects() {
    let app = app();
    let cookie = join(&app, "Bob").await;

    let reply = call(&app, Method::POST, "/api/new_round", Some(&cookie), Some(json!({ "bet": 1001 }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body["error"].as_str().unwrap().contains("invalid bet"));

    for bet in [json!({ "bet": 0 }), json!({ "bet": -10 }), json!({})] {
        let reply = call(&app, Method::POST, "/api/new_round", Some(&cookie), Some(bet)).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    }

    let state = call(&app, Method::GET, "/api/state", Some(&cookie), None).await;
    assert_eq!(state.body["balance"], 1000);
    assert_eq!(state.body["phase"], "waiting");
    assert_eq!(state.body["bet"], 0);
}

#[tokio::test]
async fn new_round_deals_and_hides_hole_card() {
    let app = app();
    let cookie = join(&app, "Carol").await;

    let reply = call(&app, Method::POST, "/api/new_round", Some(&cookie), Some(json!({ "bet": 100 }))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["balance"], 900);
    assert_eq!(reply.body["bet"], 100);
    assert_eq!(reply.body["player_hand"].as_array().unwrap().len(), 2);
    assert_eq!(reply.body["dealer_visible"].as_array().unwrap().len(), 1);
    assert!(reply.body.get("dealer_hand").is_none());
    let first_card = &reply.body["player_hand"][0];
    assert_eq!(first_card.as_array().unwrap().len(), 2);

    let first = call(&app, Method::GET, "/api/state", Some(&cookie), None).await;
    let second = call(&app, Method::GET, "/api/state", Some(&cookie), None).await;
    assert_eq!(first.body, second.body);
    assert_eq!(first.body["phase"], "playing");
    assert_eq!(first.body["balance"], 900);
    assert_eq!(first.body["player_hand"], reply.body["player_hand"]);
}

#[tokio::test]
async fn full_round_settles_balance() {
    let app = app();
    let cookie = join(&app, "Dave").await;
    call(&app, Method::POST, "/api/new_round", Some(&cookie), Some(json!({ "bet": 100 }))).await;

    let hit = call(&app, Method::POST, "/api/hit", Some(&cookie), None).await;
    assert_eq!(hit.status, StatusCode::OK);
    assert_eq!(hit.body["player_hand"].as_array().unwrap().len(), 3);
    let busted = hit.body["done"].as_bool().unwrap();
    assert_eq!(busted, hit.body["player_value"].as_u64().unwrap() > 21);

    let stand = call(&app, Method::POST, "/api/stand", Some(&cookie), None).await;
    assert_eq!(stand.status, StatusCode::OK);
    let winnings = stand.body["winnings"].as_i64().unwrap();
    assert!([-100, 0, 100].contains(&winnings));
    assert_eq!(stand.body["balance"].as_i64().unwrap(), 1000 + winnings);
    assert!(stand.body["dealer_hand"].as_array().unwrap().len() >= 2);
    assert!(stand.body["result"].is_string());
    if busted {
        assert_eq!(stand.body["outcome"], "player_bust");
        assert_eq!(winnings, -100);
    } else {
        assert!(stand.body["dealer_value"].as_u64().unwrap() >= 17);
    }

    let state = call(&app, Method::GET, "/api/state", Some(&cookie), None).await;
    assert_eq!(state.body["phase"], "finished");
    assert_eq!(state.body["bet"], 0);

    let again = call(&app, Method::POST, "/api/stand", Some(&cookie), None).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body["error"], "cannot stand while finished");
}

#[tokio::test]
async fn stand_before_any_round_is_rejected() {
    let app = app();
    let cookie = join(&app, "Erin").await;
    let reply = call(&app, Method::POST, "/api/stand", Some(&cookie), None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "cannot stand while waiting");

    let reply = call(&app, Method::POST, "/api/hit", Some(&cookie), None).await;
    assert_eq!(reply.body["error"], "cannot hit while waiting");
}

#[tokio::test]
async fn redeem_codes_pay_once_across_players() {
    let app = app();
    let frank = join(&app, "Frank").await;
    let grace = join(&app, "Grace").await;

    let reply = call(&app, Method::POST, "/api/redeem", Some(&frank), Some(json!({ "code": " bonus100 " }))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["success"], true);
    assert_eq!(reply.body["balance"], 1100);

    let reply = call(&app, Method::POST, "/api/redeem", Some(&grace), Some(json!({ "code": "bonus100" }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "invalid code");

    let reply = call(&app, Method::POST, "/api/redeem", Some(&grace), Some(json!({ "code": "admin123" }))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["admin"], true);

    let state = call(&app, Method::GET, "/api/state", Some(&grace), None).await;
    assert_eq!(state.body["balance"], 1000);
}

#[tokio::test]
async fn redeem_without_session_keeps_code() {
    let app = app();
    let reply = call(&app, Method::POST, "/api/redeem", None, Some(json!({ "code": "startbonus" }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let cookie = join(&app, "Heidi").await;
    let reply = call(&app, Method::POST, "/api/redeem", Some(&cookie), Some(json!({ "code": "startbonus" }))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["balance"], 1500);
}

#[tokio::test]
async fn bet_accepts_whole_numbers_in_any_json_form() {
    let app = app();
    let cookie = join(&app, "Ivan").await;

    let mut balance = 1000;
    for (body, bet) in [
        (r#"{"bet": 50.0}"#, 50),
        (r#"{"bet": "100"}"#, 100),
        (r#"{"bet": 1e2}"#, 100),
        (r#"{"bet": " 25 "}"#, 25),
    ] {
        let reply = post_raw(&app, "/api/new_round", &cookie, body).await;
        assert_eq!(reply.status, StatusCode::OK, "{body}: {}", reply.body);
        assert_eq!(reply.body["bet"], bet, "{body}");
        // Each new round forfeits the previous unsettled one.
        balance -= bet;
        assert_eq!(reply.body["balance"], balance, "{body}");
    }
}

#[tokio::test]
async fn malformed_body_reports_decode_error() {
    let app = app();
    let cookie = join(&app, "Judy").await;

    for body in [
        r#"{"bet": "lots"}"#,
        r#"{"bet": 50.5}"#,
        r#"{"bet": true}"#,
        r#"{"bet": 10"#,
    ] {
        let reply = post_raw(&app, "/api/new_round", &cookie, body).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{body}");
        let error = reply.body["error"].as_str().unwrap();
        assert!(!error.contains("invalid bet 0"), "{body}: {error}");
        assert!(error.contains("JSON"), "{body}: {error}");
    }

    let reply = post_raw(&app, "/api/redeem", &cookie, r#"{"code": 7}"#).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    // Nothing was dealt or charged.
    let state = call(&app, Method::GET, "/api/state", Some(&cookie), None).await;
    assert_eq!(state.body["balance"], 1000);
    assert_eq!(state.body["phase"], "waiting");

    // A request without any body is still a missing bet.
    let reply = call(&app, Method::POST, "/api/new_round", Some(&cookie), None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "invalid bet 0 (balance 1000)");
}
