use std::collections::HashMap;

use axum::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::response::Redirect;
use serde::Serialize;
use serde_json::{Map, Value};

use tabbycat_entities::prelude::*;

use crate::response::APIError;
use crate::state::AppState;
use crate::urls::{reverse_round, reverse_tournament};

pub const TOURNAMENT_SLUG_URL_KWARG: &str = "tournament_slug";
pub const ROUND_SEQ_URL_KWARG: &str = "round_seq";


/// Header information shared by every page.
#[derive(Debug, Clone, Default)]
pub struct PageMeta {
    pub title: String,
    pub subtitle: String,
    pub emoji: &'static str,
}

impl PageMeta {
    pub fn new(title: &str) -> Self {
        PageMeta { title: title.to_string(), ..Default::default() }
    }

    /// Round pages default their subtitle to the round they show.
    pub fn for_round(title: &str, round: &TournamentRound) -> Self {
        PageMeta { title: title.to_string(), subtitle: format!("as of {}", round.name), ..Default::default() }
    }

    pub fn with_emoji(self, emoji: &'static str) -> Self {
        PageMeta { emoji, ..self }
    }
}

/// JSON context of a page. Values set by the handler win over the page metadata.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    data: Map<String, Value>,
}

impl PageContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Serialize>(mut self, key: &str, value: T) -> Result<Self, APIError> {
        let value = serde_json::to_value(value).map_err(crate::response::handle_error)?;
        self.data.insert(key.to_string(), value);
        Ok(self)
    }

    pub fn finish(mut self, meta: PageMeta) -> Value {
        self.data.entry("page_title").or_insert_with(|| Value::String(meta.title));
        self.data.entry("page_subtitle").or_insert_with(|| Value::String(meta.subtitle));
        if !meta.emoji.is_empty() {
            self.data.entry("page_emoji").or_insert_with(|| Value::String(meta.emoji.to_string()));
        }
        Value::Object(self.data)
    }
}


async fn path_params(parts: &mut Parts, state: &AppState) -> Result<HashMap<String, String>, APIError> {
    let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .map_err(|_| APIError::not_found("Not found"))?;
    Ok(params)
}

/// The tournament named by the `tournament_slug` path segment.
///
/// Resolved once per request, then from the shared cache and finally from
/// the database.
#[derive(Debug, Clone)]
pub struct CurrentTournament(pub Tournament);

#[async_trait]
impl FromRequestParts<AppState> for CurrentTournament
{
    type Rejection = APIError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(resolved) = parts.extensions.get::<CurrentTournament>() {
            return Ok(resolved.clone());
        }

        let params = path_params(parts, state).await?;
        let slug = params.get(TOURNAMENT_SLUG_URL_KWARG)
            .ok_or_else(|| APIError::new(format!("Route has no {} segment", TOURNAMENT_SLUG_URL_KWARG)))?;

        let tournament = state.cache.get_tournament(slug, &state.db).await?
            .ok_or_else(|| APIError::not_found("Tournament not found"))?;

        let resolved = CurrentTournament(tournament);
        parts.extensions.insert(resolved.clone());
        Ok(resolved)
    }
}

/// The round named by `round_seq` within the current tournament.
#[derive(Debug, Clone)]
pub struct CurrentRound {
    pub tournament: Tournament,
    pub round: TournamentRound,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentRound
{
    type Rejection = APIError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(resolved) = parts.extensions.get::<CurrentRound>() {
            return Ok(resolved.clone());
        }

        let CurrentTournament(tournament) = CurrentTournament::from_request_parts(parts, state).await?;
        let params = path_params(parts, state).await?;
        let seq = params.get(ROUND_SEQ_URL_KWARG)
            .and_then(|seq| seq.parse::<i32>().ok())
            .ok_or_else(|| APIError::not_found("Round not found"))?;

        let round = state.cache.get_round(&tournament, seq, &state.db).await?
            .ok_or_else(|| APIError::not_found("Round not found"))?;

        let resolved = CurrentRound { tournament, round };
        parts.extensions.insert(resolved.clone());
        Ok(resolved)
    }
}

/// The tournament whose settings govern pages spanning all tournaments.
#[derive(Debug, Clone)]
pub struct FirstTournament(pub Tournament);

#[async_trait]
impl FromRequestParts<AppState> for FirstTournament
{
    type Rejection = APIError;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let tournament = Tournament::get_first(&state.db).await?
            .ok_or_else(|| APIError::not_found("No tournament exists"))?;
        Ok(FirstTournament(tournament))
    }
}


/// Redirects to `pattern_name` if it reverses for the tournament, else to `default_url`.
pub fn tournament_redirect_url(tournament: &Tournament, pattern_name: Option<&str>, default_url: String) -> String {
    if let Some(pattern_name) = pattern_name {
        match reverse_tournament(pattern_name, tournament) {
            Ok(url) => return url,
            Err(e) => tracing::debug!("{}, using default redirect", e),
        }
    }
    default_url
}

pub fn round_redirect_url(tournament: &Tournament, round: &TournamentRound, pattern_name: Option<&str>, default_url: String) -> String {
    if let Some(pattern_name) = pattern_name {
        match reverse_round(pattern_name, tournament, round) {
            Ok(url) => return url,
            Err(e) => tracing::debug!("{}, using default redirect", e),
        }
    }
    default_url
}

pub fn redirect_tournament(name: &str, tournament: &Tournament) -> Result<Redirect, APIError> {
    let url = reverse_tournament(name, tournament).map_err(crate::response::handle_error)?;
    Ok(Redirect::to(&url))
}


#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_page_meta_fills_missing_keys() {
        let context = PageContext::new().finish(PageMeta::new("Participants").with_emoji("🚌"));
        assert_eq!(context, json!({"page_title": "Participants", "page_subtitle": "", "page_emoji": "🚌"}));
    }

    #[test]
    fn test_handler_values_are_not_overwritten() {
        let context = PageContext::new()
            .insert("page_title", "Custom").unwrap()
            .finish(PageMeta::new("Default"));
        assert_eq!(context["page_title"], "Custom");
    }

    #[test]
    fn test_empty_emoji_is_omitted() {
        let context = PageContext::new().finish(PageMeta::new("Draw"));
        assert!(context.get("page_emoji").is_none());
    }

    #[test]
    fn test_round_subtitle() {
        let round = TournamentRound::new(sea_orm::prelude::Uuid::from_u128(1), 2);
        let context = PageContext::new().finish(PageMeta::for_round("Draw", &round));
        assert_eq!(context["page_subtitle"], "as of Round 2");
    }

    #[test]
    fn test_redirect_falls_back_on_unknown_pattern() {
        let tournament = Tournament::new("bp".into(), "BP".into());
        let url = tournament_redirect_url(&tournament, Some("adjudicators-edit"), "/fallback".into());
        assert_eq!(url, "/fallback");
        let url = tournament_redirect_url(&tournament, Some("tournament-public-participants"), "/fallback".into());
        assert_eq!(url, "/t/bp/participants");
    }
}
