use std::collections::BTreeMap;

use axum::{extract::State, response::Json, routing::get, Router};
use itertools::Itertools;
use sea_orm::{prelude::*, TransactionTrait};
use serde_json::Value;

use tabbycat_entities::preferences::PreferenceError;
use tabbycat_entities::prelude::*;

use crate::{
    action_log::log_action,
    auth::RequireSuperuser,
    context::CurrentTournament,
    response::{handle_error, APIError},
    state::AppState,
};


fn preference_error(err: PreferenceError) -> APIError {
    match err {
        PreferenceError::DbErr(e) => handle_error(e),
        err => APIError::bad_request(err.to_string()),
    }
}

async fn get_options_handler(
    State(db): State<DatabaseConnection>,
    RequireSuperuser(user): RequireSuperuser,
    CurrentTournament(tournament): CurrentTournament,
) -> Result<Json<BTreeMap<String, Value>>, APIError> {
    user.check_can_administer(tournament.uuid)?;
    let preferences = Preferences::load(&db, tournament.uuid).await?;
    Ok(Json(preferences.as_map()))
}

/// Updates the posted options. Nothing is stored unless every key and value is valid.
async fn patch_options_handler(
    State(db): State<DatabaseConnection>,
    RequireSuperuser(user): RequireSuperuser,
    CurrentTournament(tournament): CurrentTournament,
    Json(request): Json<BTreeMap<String, Value>>,
) -> Result<Json<BTreeMap<String, Value>>, APIError> {
    user.check_can_administer(tournament.uuid)?;

    let updates = request.into_iter().map(|(key, value)| {
        let pref = Preference::from_key(&key)?;
        pref.validate(&value)?;
        Ok((pref, value))
    }).collect::<Result<Vec<_>, PreferenceError>>().map_err(preference_error)?;

    let txn = db.begin().await?;
    let mut preferences = Preferences::load(&txn, tournament.uuid).await?;
    for (pref, value) in updates.iter() {
        preferences.set(&txn, *pref, value.clone()).await.map_err(preference_error)?;
    }
    let changed = updates.iter().map(|(pref, value)| format!("{}={}", pref.key(), value)).join(", ");
    log_action(&txn, ActionLogType::OptionsEdit, &user, &tournament, None, Some(changed)).await?;
    txn.commit().await?;

    Ok(Json(preferences.as_map()))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/t/:tournament_slug/admin/options", get(get_options_handler).patch(patch_options_handler))
}
