use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use giftdraw_core::{
    core_version, DrawService, ItemId, Participant, ParticipantId, ParticipantService,
    PurchaseAction,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{error::AppError, state::AppState};

#[derive(Deserialize)]
pub struct CreateParticipant {
    name: Option<String>,
}

#[derive(Deserialize)]
pub struct AddWish {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TogglePurchase {
    buyer_id: Option<String>,
    action: Option<String>,
}

#[derive(Serialize)]
pub struct Message {
    message: String,
}

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    version: &'static str,
}

pub async fn health_handler() -> impl IntoResponse {
    Json(Health {
        status: "ok",
        version: core_version(),
    })
}

pub async fn list_participants_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Participant>>, AppError> {
    let participants = state
        .run(|repo| Ok(ParticipantService::new(repo).list_participants()?))
        .await?;
    Ok(Json(participants))
}

pub async fn get_participant_handler(
    State(state): State<Arc<AppState>>,
    Path(participant_id): Path<String>,
) -> Result<Json<Participant>, AppError> {
    let participant_id = parse_participant_id(&participant_id)?;
    let participant = state
        .run(move |repo| Ok(ParticipantService::new(repo).get_participant(participant_id)?))
        .await?;
    Ok(Json(participant))
}

pub async fn create_participant_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateParticipant>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(malformed)?;
    let name = payload
        .name
        .ok_or_else(|| AppError::Validation("name is required".to_string()))?;

    let participant = state
        .run(move |repo| Ok(ParticipantService::new(repo).create_participant(&name)?))
        .await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

pub async fn add_wish_handler(
    State(state): State<Arc<AppState>>,
    Path(participant_id): Path<String>,
    payload: Result<Json<AddWish>, JsonRejection>,
) -> Result<Json<Participant>, AppError> {
    let participant_id = parse_participant_id(&participant_id)?;
    let Json(payload) = payload.map_err(malformed)?;
    let text = payload
        .text
        .ok_or_else(|| AppError::Validation("text is required".to_string()))?;

    let participant = state
        .run(move |repo| Ok(ParticipantService::new(repo).add_wish(participant_id, &text)?))
        .await?;
    Ok(Json(participant))
}

pub async fn remove_wish_handler(
    State(state): State<Arc<AppState>>,
    Path((participant_id, item_id)): Path<(String, String)>,
) -> Result<Json<Participant>, AppError> {
    let participant_id = parse_participant_id(&participant_id)?;
    let item_id = parse_item_id(&item_id)?;

    let participant = state
        .run(move |repo| Ok(ParticipantService::new(repo).remove_wish(participant_id, item_id)?))
        .await?;
    Ok(Json(participant))
}

pub async fn purchase_handler(
    State(state): State<Arc<AppState>>,
    Path((recipient_id, item_id)): Path<(String, String)>,
    payload: Result<Json<TogglePurchase>, JsonRejection>,
) -> Result<Json<Participant>, AppError> {
    let recipient_id = parse_participant_id(&recipient_id)?;
    let item_id = parse_item_id(&item_id)?;
    let Json(payload) = payload.map_err(malformed)?;

    let action = match payload.action.as_deref().map(str::trim) {
        Some("buy") => PurchaseAction::Buy,
        Some("release") => PurchaseAction::Release,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "unknown action `{other}`; expected buy|release"
            )))
        }
        None => return Err(AppError::Validation("action is required".to_string())),
    };
    let buyer_id = match payload.buyer_id.as_deref() {
        Some(raw) if action == PurchaseAction::Buy => Some(parse_id(raw, "buyer")?),
        _ => None,
    };

    let participant = state
        .run(move |repo| {
            Ok(ParticipantService::new(repo).set_purchase(recipient_id, item_id, buyer_id, action)?)
        })
        .await?;
    Ok(Json(participant))
}

pub async fn draw_handler(State(state): State<Arc<AppState>>) -> Result<Json<Message>, AppError> {
    let summary = state
        .run(|repo| Ok(DrawService::new(repo).run_draw(&mut rand::rng())?))
        .await?;
    Ok(Json(Message {
        message: format!("Draw completed for {} participants", summary.participants),
    }))
}

pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<Message>, AppError> {
    state
        .run(|repo| Ok(DrawService::new(repo).reset_all()?))
        .await?;
    Ok(Json(Message {
        message: "Reset completed".to_string(),
    }))
}

fn malformed(rejection: JsonRejection) -> AppError {
    AppError::MalformedPayload(rejection.body_text())
}

fn parse_participant_id(raw: &str) -> Result<ParticipantId, AppError> {
    parse_id(raw, "participant")
}

fn parse_item_id(raw: &str) -> Result<ItemId, AppError> {
    parse_id(raw, "wishlist item")
}

// Ids that are not UUIDs cannot exist in the store.
fn parse_id(raw: &str, kind: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(format!("{kind} not found: {raw}")))
}
