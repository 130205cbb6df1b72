use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    auth::AuthorizedToken,
    envelope::{assemble, GenerationFailure},
    error::ApiError,
    AppState,
};
use crate::model::character::{CharacterRequest, CharacterResponse};

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "NPC AI Server is running!" }))
}

pub async fn generate_npc(
    State(state): State<AppState>,
    _token: AuthorizedToken,
    payload: Result<Json<CharacterRequest>, JsonRejection>,
) -> Result<Json<CharacterResponse>, ApiError> {
    let Json(request) = payload?;
    let request_id = Uuid::new_v4().to_string();

    info!(
        request_id = %request_id,
        is_daytime = request.is_daytime,
        "npc generation requested"
    );

    let outcome = match state.prompts.build(&request) {
        Ok(prompt) => state
            .completion
            .complete(&prompt)
            .await
            .map_err(GenerationFailure::from),
        Err(err) => Err(GenerationFailure::from(err)),
    };

    match &outcome {
        Ok(npc_data) => info!(
            request_id = %request_id,
            bytes = npc_data.len(),
            "npc generated"
        ),
        Err(err) => warn!(request_id = %request_id, error = %err, "npc generation failed"),
    }

    Ok(Json(assemble(request, outcome, state.prompts.messages())))
}
