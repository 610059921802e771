use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::info;

use super::state::AppState;
use super::{Result, WebError};
use crate::core::{ErrorMessage, Item, ItemDraft, ItemError};

/// Summary used when the request body cannot be read as an item draft.
pub const MALFORMED_BODY_MESSAGE: &str = "Malformed Request Body";

type DraftBody = std::result::Result<Json<ItemDraft>, JsonRejection>;

pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>> {
    Ok(Json(state.store.list_all().await?))
}

pub async fn create_item(
    State(state): State<AppState>,
    body: DraftBody,
) -> Result<(StatusCode, Json<Item>)> {
    let item = read_draft(body)?.validate()?;
    let saved = state.store.save(item).await?;
    info!(item_id = ?saved.id, "item created");
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn get_item(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Item>> {
    let item = find_existing(&state, id).await?;
    Ok(Json(item))
}

/// Full replacement; the path id wins over anything in the body.
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: DraftBody,
) -> Result<(StatusCode, Json<Item>)> {
    find_existing(&state, id).await?;

    let mut item = read_draft(body)?.validate()?;
    item.id = Some(id);
    let saved = state.store.save(item).await?;
    Ok((StatusCode::ACCEPTED, Json(saved)))
}

pub async fn delete_item(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    find_existing(&state, id).await?;
    state.store.delete_by_id(id).await?;
    info!(item_id = id, "item deleted");
    Ok(StatusCode::OK)
}

pub async fn process_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>> {
    let items = state.processor.process_all().wait().await?;
    Ok(Json(items))
}

async fn find_existing(state: &AppState, id: i64) -> Result<Item> {
    let item = state
        .store
        .find_by_id(id)
        .await?
        .ok_or(ItemError::NotFound(id))?;
    Ok(item)
}

// Bad JSON and wrong field types answer 400 like any other input error,
// with the decoder's message under "body".
fn read_draft(body: DraftBody) -> Result<ItemDraft> {
    match body {
        Ok(Json(draft)) => Ok(draft),
        Err(rejection) => {
            let mut errors = ErrorMessage::new(MALFORMED_BODY_MESSAGE);
            errors.insert("body", rejection.body_text());
            Err(WebError::Validation(errors))
        }
    }
}
