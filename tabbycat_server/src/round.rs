use std::str::FromStr;

use axum::{
    extract::State,
    response::{Json, Redirect},
    routing::{get, post},
    Router,
};
use sea_orm::TransactionTrait;
use serde::{Serialize, Deserialize};

use tabbycat_entities::prelude::*;

use crate::{
    action_log::log_action,
    auth::RequireSuperuser,
    cache::CacheKey,
    context::{round_redirect_url, tournament_redirect_url, CurrentRound},
    response::{handle_error, APIError},
    state::AppState,
    urls::reverse_tournament,
};

const TOURNAMENT_REDIRECT_PATTERN_NAME: Option<&str> = None;
const ROUND_REDIRECT_PATTERN_NAME: Option<&str> = Some("adjudicators-edit");


async fn round_index_handler(
    RequireSuperuser(user): RequireSuperuser,
    CurrentRound { tournament, round }: CurrentRound,
) -> Result<Redirect, APIError> {
    user.check_can_administer(tournament.uuid)?;

    let default_url = reverse_tournament("tournament-public-index", &tournament).map_err(handle_error)?;
    let tournament_url = tournament_redirect_url(&tournament, TOURNAMENT_REDIRECT_PATTERN_NAME, default_url);
    let url = round_redirect_url(&tournament, &round, ROUND_REDIRECT_PATTERN_NAME, tournament_url);
    Ok(Redirect::to(&url))
}


#[derive(Debug, Serialize, Deserialize)]
pub struct DrawStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DrawStatusResponse {
    pub status: DrawStatus,
}

async fn set_draw_status_handler(
    State(state): State<AppState>,
    RequireSuperuser(user): RequireSuperuser,
    CurrentRound { tournament, mut round }: CurrentRound,
    Json(request): Json<DrawStatusRequest>,
) -> Result<Json<DrawStatusResponse>, APIError> {
    user.check_can_administer(tournament.uuid)?;

    let target = DrawStatus::from_str(&request.status).map_err(|e| APIError::bad_request(e.to_string()))?;
    let previous = round.draw_status;
    if !previous.can_transition_to(target) {
        return Err(APIError::bad_request(format!("Can't change draw status from {} to {}", previous, target)));
    }

    round.draw_status = target;
    let txn = state.db.begin().await?;
    round.save(&txn, false).await?;
    log_action(&txn, ActionLogType::DrawStatusEdit, &user, &tournament, Some(&round), Some(format!("{} -> {}", previous, target))).await?;
    txn.commit().await?;

    state.cache.invalidate(CacheKey::Round(tournament.slug.clone(), round.seq)).await;

    Ok(Json(DrawStatusResponse { status: round.draw_status }))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/t/:tournament_slug/admin/round/:round_seq/", get(round_index_handler))
        .route("/t/:tournament_slug/admin/round/:round_seq/draw/status", post(set_draw_status_handler))
}
