use std::fmt;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{
    de::{self, Unexpected, Visitor},
    Deserialize, Deserializer, Serialize,
};

use super::{ApiError, AppState, SESSION_COOKIE};
use crate::{
    error::GameError,
    game::{HitResult, RoundSnapshot, SessionSnapshot, SettleResult},
    redeem::Redemption,
    session::PlayerId,
};

const DEFAULT_PLAYER_NAME: &str = "Player";

#[derive(Deserialize, Default)]
pub(super) struct InitRequest {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Serialize)]
pub(super) struct InitResponse {
    name: String,
    balance: u64,
    message: &'static str,
}

#[derive(Deserialize, Default)]
pub(super) struct NewRoundRequest {
    #[serde(default, deserialize_with = "deserialize_bet")]
    bet: i64,
}

/// Accepts a bet as a JSON integer, a whole float (`50.0`, `1e2`) or a
/// numeric string (`"100"`). `null` counts as no bet.
fn deserialize_bet<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(BetVisitor)
}

struct BetVisitor;

impl<'de> Visitor<'de> for BetVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a whole number of chips")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
        Ok(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
        i64::try_from(value).map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<i64, E> {
        // i64::MAX is not representable as f64; the bound is exclusive.
        if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Ok(value as i64)
        } else {
            Err(E::invalid_value(Unexpected::Float(value), &self))
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<i64, E> {
        value
            .trim()
            .parse()
            .map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<i64, E> {
        Ok(0)
    }
}

#[derive(Deserialize, Default)]
pub(super) struct RedeemRequest {
    #[serde(default)]
    code: String,
}

#[derive(Serialize)]
#[serde(untagged)]
pub(super) enum RedeemResponse {
    Admin {
        admin: bool,
        message: &'static str,
    },
    Credit {
        success: bool,
        balance: u64,
        message: String,
    },
}

/// Player id from the `session_id` cookie, if the request carries one.
fn session_cookie(headers: &HeaderMap) -> Option<PlayerId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| PlayerId::from(value))
}

fn require_player(headers: &HeaderMap) -> Result<PlayerId, ApiError> {
    session_cookie(headers).ok_or(ApiError::Game(GameError::NoActiveSession))
}

/// Request body, or the default when the client sent none. A body that is
/// present but does not decode is rejected with the decoder's reason.
fn json_body<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(request)) => Ok(request),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(ApiError::Body(rejection)),
    }
}

fn set_cookie(id: &PlayerId) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax"
    ))
    .ok()
}

pub(super) async fn healthz() -> &'static str {
    "ok"
}

pub(super) async fn init(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<InitRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(body)?;
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_PLAYER_NAME);

    let mut sessions = state.sessions();
    // Only ids this process issued are reused; anything else gets a fresh one.
    let (id, issued) = match session_cookie(&headers) {
        Some(id) if sessions.contains(&id) => (id, false),
        _ => (PlayerId::generate(), true),
    };
    let session = sessions.resolve(&id, name);
    let body = Json(InitResponse {
        name: session.name().to_string(),
        balance: session.balance(),
        message: "Welcome!",
    });
    drop(sessions);

    let mut response = body.into_response();
    if issued {
        if let Some(cookie) = set_cookie(&id) {
            response.headers_mut().insert(header::SET_COOKIE, cookie);
        }
    }
    Ok(response)
}

pub(super) async fn state(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let id = require_player(&headers)?;
    let snapshot = state.sessions().snapshot(&id)?;
    Ok(Json(snapshot))
}

pub(super) async fn new_round(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<NewRoundRequest>, JsonRejection>,
) -> Result<Json<RoundSnapshot>, ApiError> {
    let id = require_player(&headers)?;
    let request = json_body(body)?;
    let snapshot = state.sessions().get_mut(&id)?.start_round(request.bet)?;
    Ok(Json(snapshot))
}

pub(super) async fn hit(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<HitResult>, ApiError> {
    let id = require_player(&headers)?;
    let result = state.sessions().get_mut(&id)?.hit()?;
    Ok(Json(result))
}

pub(super) async fn stand(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SettleResult>, ApiError> {
    let id = require_player(&headers)?;
    let result = state.sessions().get_mut(&id)?.stand()?;
    Ok(Json(result))
}

pub(super) async fn redeem(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RedeemRequest>, JsonRejection>,
) -> Result<Json<RedeemResponse>, ApiError> {
    let id = require_player(&headers)?;
    let request = json_body(body)?;

    let mut sessions = state.sessions();
    let session = sessions.get_mut(&id)?;
    let response = match state.codes().redeem(&request.code)? {
        Redemption::Admin => {
            tracing::warn!(player = %id, "admin code redeemed");
            RedeemResponse::Admin {
                admin: true,
                message: "Admin mode is not available yet",
            }
        }
        Redemption::Credit(amount) => {
            let balance = session.credit(amount);
            tracing::info!(player = %id, amount, balance, "bonus code redeemed");
            RedeemResponse::Credit {
                success: true,
                balance,
                message: format!("+{amount} added!"),
            }
        }
    };
    Ok(Json(response))
}
