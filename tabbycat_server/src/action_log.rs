use axum::{extract::State, routing::get, Json, Router};
use sea_orm::prelude::*;
use serde::{Serialize, Deserialize};

use tabbycat_entities::prelude::*;

use crate::{
    auth::{AuthenticatedUser, RequireSuperuser},
    context::CurrentTournament,
    response::APIError,
    state::AppState,
};

const ACTION_LOG_PAGE_SIZE: u64 = 50;


pub async fn log_action<C>(
    db: &C,
    action_type: ActionLogType,
    user: &AuthenticatedUser,
    tournament: &Tournament,
    round: Option<&TournamentRound>,
    content: Option<String>,
) -> Result<(), DbErr> where C: ConnectionTrait {
    let entry = ActionLogEntry::new(action_type, Some(user.uuid), tournament.uuid, round.map(|r| r.uuid), content);
    entry.save(db).await?;
    tracing::info!("{} by {} in {}", action_type.as_str(), user.username, tournament.slug);
    Ok(())
}


#[derive(Debug, Serialize, Deserialize)]
pub struct ActionLogEntryResponse {
    pub uuid: Uuid,
    #[serde(rename = "type")]
    pub action_type: ActionLogType,
    pub description: String,
    pub user_id: Option<Uuid>,
    pub round_id: Option<Uuid>,
    pub content: Option<String>,
    pub timestamp: chrono::NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionLogResponse {
    pub entries: Vec<ActionLogEntryResponse>,
}

async fn get_action_log_handler(
    State(db): State<DatabaseConnection>,
    RequireSuperuser(user): RequireSuperuser,
    CurrentTournament(tournament): CurrentTournament,
) -> Result<Json<ActionLogResponse>, APIError> {
    user.check_can_administer(tournament.uuid)?;

    let entries = ActionLogEntry::get_latest_for_tournament(&db, tournament.uuid, ACTION_LOG_PAGE_SIZE).await?;
    Ok(Json(ActionLogResponse {
        entries: entries.into_iter().map(|e| ActionLogEntryResponse {
            uuid: e.uuid,
            action_type: e.action_type,
            description: e.action_type.description().to_string(),
            user_id: e.user_id,
            round_id: e.round_id,
            content: e.content,
            timestamp: e.timestamp,
        }).collect()
    }))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/t/:tournament_slug/admin/actionlog", get(get_action_log_handler))
}
