use axum::{
    extract::State,
    headers::Cookie,
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router, TypedHeader,
};
use sea_orm::prelude::*;

use tabbycat_entities::derived_models::public_draw::{ParticipantList, PublicDraw};
use tabbycat_entities::prelude::*;

use crate::{
    context::{redirect_tournament, CurrentRound, CurrentTournament, FirstTournament, PageContext, PageMeta},
    messages::{clear_messages, pending_messages, queue_message, FlashMessage},
    response::{handle_error, APIError},
    state::AppState,
};

pub const DISABLED_PAGE_MESSAGE: &str = "That page isn't enabled for this tournament.";


/// A page visible to the public only while a tournament preference enables it.
#[derive(Debug, Clone, Copy)]
pub struct PublicPage {
    pub preference: Option<Preference>,
    pub disabled_message: &'static str,
}

impl PublicPage {
    pub const fn gated_by(preference: Preference) -> Self {
        PublicPage { preference: Some(preference), disabled_message: DISABLED_PAGE_MESSAGE }
    }

    /// Returns the redirect to send instead of the page when the page is disabled.
    pub async fn check<C>(&self, db: &C, tournament: &Tournament, cookie: Option<&Cookie>) -> Result<Option<Response>, APIError> where C: ConnectionTrait {
        let preference = self.preference.ok_or_else(|| {
            APIError::from((StatusCode::INTERNAL_SERVER_ERROR, "public_page_preference isn't set on this view."))
        })?;

        let preferences = Preferences::load(db, tournament.uuid).await?;
        if preferences.pref_bool(preference) {
            return Ok(None);
        }

        tracing::error!("Tried to access a disabled public page");
        let set_cookie = queue_message(cookie, FlashMessage::error(self.disabled_message))?;
        let redirect = redirect_tournament("tournament-public-index", tournament)?;
        Ok(Some(([(SET_COOKIE, set_cookie)], redirect).into_response()))
    }
}

const PARTICIPANTS_PAGE: PublicPage = PublicPage::gated_by(Preference::PublicParticipants);
const DRAW_PAGE: PublicPage = PublicPage::gated_by(Preference::PublicDraw);


async fn public_index_handler(
    CurrentTournament(tournament): CurrentTournament,
    cookie: Option<TypedHeader<Cookie>>,
) -> Result<Response, APIError> {
    let messages = pending_messages(cookie.as_ref().map(|c| &c.0));
    let context = PageContext::new()
        .insert("tournament_name", &tournament.name)?
        .insert("tournament_slug", &tournament.slug)?
        .insert("messages", &messages)?
        .finish(PageMeta::new(&tournament.name));

    if messages.is_empty() {
        Ok(Json(context).into_response())
    }
    else {
        Ok(([(SET_COOKIE, clear_messages())], Json(context)).into_response())
    }
}

async fn public_participants_handler(
    State(db): State<DatabaseConnection>,
    CurrentTournament(tournament): CurrentTournament,
    cookie: Option<TypedHeader<Cookie>>,
) -> Result<Response, APIError> {
    if let Some(redirect) = PARTICIPANTS_PAGE.check(&db, &tournament, cookie.as_ref().map(|c| &c.0)).await? {
        return Ok(redirect);
    }

    let participants = ParticipantList::load_for_tournament(&db, tournament.uuid).await?;
    let context = PageContext::new()
        .insert("adjudicators", &participants.adjudicators)?
        .insert("teams", &participants.teams)?
        .finish(PageMeta::new("Participants").with_emoji("🚌"));
    Ok(Json(context).into_response())
}

async fn public_draw_handler(
    State(db): State<DatabaseConnection>,
    CurrentRound { tournament, round }: CurrentRound,
    cookie: Option<TypedHeader<Cookie>>,
) -> Result<Response, APIError> {
    if let Some(redirect) = DRAW_PAGE.check(&db, &tournament, cookie.as_ref().map(|c| &c.0)).await? {
        return Ok(redirect);
    }

    if round.draw_status != DrawStatus::Released {
        return Err(APIError::new_with_status(StatusCode::FORBIDDEN, "Draw has not been released yet"));
    }

    let draw = PublicDraw::load_for_round(&db, &round).await.map_err(handle_error)?;
    let context = PageContext::new()
        .insert("round_name", &draw.round_name)?
        .insert("debates", &draw.debates)?
        .finish(PageMeta::for_round("Draw", &round).with_emoji("👏"));
    Ok(Json(context).into_response())
}

/// Adjudicators across all tournaments, governed by the first tournament's settings.
async fn all_adjudicators_handler(
    State(db): State<DatabaseConnection>,
    FirstTournament(tournament): FirstTournament,
    cookie: Option<TypedHeader<Cookie>>,
) -> Result<Response, APIError> {
    if let Some(redirect) = PARTICIPANTS_PAGE.check(&db, &tournament, cookie.as_ref().map(|c| &c.0)).await? {
        return Ok(redirect);
    }

    let participants = ParticipantList::load_all_adjudicators(&db).await?;
    let context = PageContext::new()
        .insert("adjudicators", &participants.adjudicators)?
        .finish(PageMeta::new("All Adjudicators").with_emoji("⚖"));
    Ok(Json(context).into_response())
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/t/:tournament_slug/", get(public_index_handler))
        .route("/t/:tournament_slug/participants", get(public_participants_handler))
        .route("/t/:tournament_slug/round/:round_seq/draw", get(public_draw_handler))
        .route("/participants/adjudicators", get(all_adjudicators_handler))
}
