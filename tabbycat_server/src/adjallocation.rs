use std::str::FromStr;

use axum::{
    async_trait,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Form, Router,
};
use itertools::Itertools;
use sea_orm::{prelude::*, DatabaseTransaction, TransactionTrait};
use serde::{Serialize, Deserialize};

use tabbycat_allocation::{allocate_adjudicators, AllocationError, HungarianAllocator};
use tabbycat_entities::derived_models::allocation_draw::{
    load_regions, load_unallocated_adjudicators, AllocationDraw, CategoryInfo, DragAndDropDebate, LoadDrawError,
    RegionInfo, UnallocatedAdjudicatorInfo,
};
use tabbycat_entities::domain::debate_adjudicator::PanelError;
use tabbycat_entities::prelude::*;

use crate::{
    action_log::log_action,
    auth::{AuthenticatedUser, RequireSuperuser},
    context::{CurrentRound, PageContext, PageMeta},
    response::{handle_error, APIError},
    state::AppState,
    urls::reverse_round,
};


fn draw_error(err: LoadDrawError) -> APIError {
    handle_error(err)
}

fn allocation_error(err: AllocationError) -> APIError {
    match err {
        AllocationError::InvalidPreferences(message) => APIError::bad_request(message),
        AllocationError::UnknownRound(_) => APIError::not_found("Round not found"),
        err => handle_error(err),
    }
}

fn panel_error(err: PanelError) -> APIError {
    match err {
        PanelError::UnknownAdjudicator(_) => APIError::not_found(&err.to_string()),
        PanelError::DuplicateAdjudicator(_) | PanelError::Position(_) => APIError::bad_request(err.to_string()),
        err => handle_error(err),
    }
}


#[derive(Debug, Serialize, Deserialize)]
pub struct RoundInfo {
    #[serde(rename = "updateImportanceURL")]
    pub update_importance_url: String,
    #[serde(rename = "autoAllocationURL")]
    pub auto_allocation_url: String,
    #[serde(rename = "saveURL")]
    pub save_url: String,
    #[serde(rename = "scoreMin")]
    pub score_min: f64,
    #[serde(rename = "scoreMax")]
    pub score_max: f64,
    #[serde(rename = "scoreForVote")]
    pub score_for_vote: f64,
    #[serde(rename = "allowDuplicateAllocations")]
    pub allow_duplicate_allocations: bool,
    pub regions: Vec<RegionInfo>,
    pub categories: Vec<CategoryInfo>,
}

async fn edit_allocation_handler(
    State(db): State<DatabaseConnection>,
    RequireSuperuser(user): RequireSuperuser,
    CurrentRound { tournament, round }: CurrentRound,
) -> Result<Json<serde_json::Value>, APIError> {
    user.check_can_administer(tournament.uuid)?;

    let preferences = Preferences::load(&db, tournament.uuid).await?;
    let draw = AllocationDraw::load_for_round(&db, &round).await.map_err(draw_error)?;

    let reverse = |name: &str| reverse_round(name, &tournament, &round).map_err(handle_error);
    let round_info = RoundInfo {
        update_importance_url: reverse("save-debate-importance")?,
        auto_allocation_url: reverse("adjudicators-auto-allocate")?,
        save_url: reverse("save-debate-panel")?,
        score_min: preferences.pref_f64(Preference::AdjMinScore),
        score_max: preferences.pref_f64(Preference::AdjMaxScore),
        score_for_vote: preferences.pref_f64(Preference::AdjMinVotingScore),
        allow_duplicate_allocations: preferences.pref_bool(Preference::DuplicateAdjs),
        regions: draw.regions,
        categories: draw.categories,
    };

    let context = PageContext::new()
        .insert("round_info", round_info)?
        .insert("debates", draw.debates)?
        .insert("unallocatedAdjudicators", draw.unallocated_adjudicators)?
        .finish(PageMeta::for_round("Edit Adjudicator Allocation", &round).with_emoji("👫"));
    Ok(Json(context))
}


#[derive(Debug, Serialize, Deserialize)]
pub struct AutoAllocationResponse {
    pub debates: Vec<DragAndDropDebate>,
    #[serde(rename = "unallocatedAdjudicators")]
    pub unallocated_adjudicators: Vec<UnallocatedAdjudicatorInfo>,
}

async fn create_auto_allocation_handler(
    State(db): State<DatabaseConnection>,
    RequireSuperuser(user): RequireSuperuser,
    CurrentRound { tournament, round }: CurrentRound,
) -> Result<Json<AutoAllocationResponse>, APIError> {
    user.check_can_administer(tournament.uuid)?;

    if round.draw_status == DrawStatus::Released {
        return Err(APIError::bad_request("Draw is already released, unrelease draw to redo auto-allocations."));
    }
    if round.draw_status != DrawStatus::Confirmed {
        return Err(APIError::bad_request("Draw is not confirmed, confirm draw to run auto-allocations."));
    }

    let txn = db.begin().await?;
    log_action(&txn, ActionLogType::AdjudicatorsAuto, &user, &tournament, Some(&round), None).await?;

    let preferences = Preferences::load(&txn, tournament.uuid).await?;
    let allocator = HungarianAllocator::from_preferences(&preferences).map_err(allocation_error)?;
    allocate_adjudicators(&txn, round.uuid, &allocator).await.map_err(allocation_error)?;

    let debates = DragAndDropDebate::load_many(&txn, Debate::get_all_in_round(&txn, round.uuid).await?)
        .await
        .map_err(draw_error)?;
    let regions = load_regions(&txn).await?;
    let unallocated_adjudicators = load_unallocated_adjudicators(&txn, &round, &regions).await?;
    txn.commit().await?;

    Ok(Json(AutoAllocationResponse { debates, unallocated_adjudicators }))
}


#[derive(Debug, Serialize, Deserialize)]
pub struct SaveDebateImportanceForm {
    pub debate_id: String,
    pub importance: String,
}

async fn save_debate_importance_handler(
    State(db): State<DatabaseConnection>,
    RequireSuperuser(user): RequireSuperuser,
    CurrentRound { tournament, round }: CurrentRound,
    Form(form): Form<SaveDebateImportanceForm>,
) -> Result<StatusCode, APIError> {
    user.check_can_administer(tournament.uuid)?;

    let debate_id = Uuid::parse_str(form.debate_id.trim()).map_err(|_| APIError::bad_request("Invalid debate id"))?;
    let importance = form.importance.trim().parse::<i32>()
        .map_err(|_| APIError::bad_request(format!("Invalid importance {}", form.importance)))?;

    let mut debate = Debate::get(&db, debate_id).await?.ok_or_else(|| APIError::not_found("Debate not found"))?;
    if debate.round_id != round.uuid {
        return Err(APIError::bad_request("Debate is not part of this round"));
    }
    debate.set_importance(importance).map_err(|e| APIError::bad_request(e.to_string()))?;

    let txn = db.begin().await?;
    debate.save(&txn, false).await?;
    log_action(&txn, ActionLogType::DebateImportanceEdit, &user, &tournament, Some(&round), Some(format!("{}: {}", debate.uuid, importance))).await?;
    txn.commit().await?;

    Ok(StatusCode::OK)
}


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostedAdjudicator {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostedPanellist {
    pub adjudicator: PostedAdjudicator,
    pub position: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostedDebate {
    pub id: Uuid,
    #[serde(default)]
    pub panel: Vec<PostedPanellist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveDebatesRequest {
    #[serde(default)]
    pub moved_item: Option<Uuid>,
    pub debates: Vec<PostedDebate>,
}

/// A drag and drop editor that saves the debates touched by one move.
#[async_trait]
pub trait SaveDragAndDropDebate: Sync {
    type MovedItem: Send;

    fn action_type(&self) -> ActionLogType;

    async fn get_moved_item(&self, db: &DatabaseTransaction, id: Uuid) -> Result<Self::MovedItem, APIError>;

    fn describe_moved_item(&self, item: &Self::MovedItem) -> String;

    async fn modify_debate(&self, db: &DatabaseTransaction, debate: &Debate, posted: &PostedDebate) -> Result<(), APIError>;
}

pub async fn save_drag_and_drop_debates<S>(
    saver: &S,
    db: &DatabaseConnection,
    user: &AuthenticatedUser,
    tournament: &Tournament,
    round: &TournamentRound,
    request: SaveDebatesRequest,
) -> Result<Vec<DragAndDropDebate>, APIError> where S: SaveDragAndDropDebate {
    let txn = db.begin().await?;

    let moved_item = match request.moved_item {
        Some(id) => Some(saver.get_moved_item(&txn, id).await?),
        None => None,
    };

    let mut debates = Vec::with_capacity(request.debates.len());
    for posted in request.debates.iter() {
        let debate = Debate::get(&txn, posted.id).await?.ok_or_else(|| APIError::not_found("Debate not found"))?;
        if debate.round_id != round.uuid {
            return Err(APIError::bad_request("Debate is not part of this round"));
        }
        saver.modify_debate(&txn, &debate, posted).await?;
        debates.push(debate);
    }

    let content = moved_item.map(|item| saver.describe_moved_item(&item));
    log_action(&txn, saver.action_type(), user, tournament, Some(round), content).await?;

    let debates = DragAndDropDebate::load_many(&txn, debates).await.map_err(draw_error)?;
    txn.commit().await?;
    Ok(debates)
}

pub struct DebatePanelSaver;

#[async_trait]
impl SaveDragAndDropDebate for DebatePanelSaver {
    type MovedItem = Adjudicator;

    fn action_type(&self) -> ActionLogType {
        ActionLogType::AdjudicatorsSave
    }

    async fn get_moved_item(&self, db: &DatabaseTransaction, id: Uuid) -> Result<Adjudicator, APIError> {
        Adjudicator::get(db, id).await?.ok_or_else(|| APIError::not_found("Adjudicator not found"))
    }

    fn describe_moved_item(&self, item: &Adjudicator) -> String {
        item.name.clone()
    }

    async fn modify_debate(&self, db: &DatabaseTransaction, debate: &Debate, posted: &PostedDebate) -> Result<(), APIError> {
        let panel = posted.panel.iter().map(|panellist| {
            let position = AdjudicatorPosition::from_str(&panellist.position)
                .map_err(|e| APIError::bad_request(e.to_string()))?;
            Ok(PanelMember { adjudicator_id: panellist.adjudicator.id, position })
        }).collect::<Result<Vec<_>, APIError>>()?;

        let changes = DebateAdjudicator::apply_panel(db, debate.uuid, &panel).await.map_err(panel_error)?;
        tracing::debug!(
            "Saved panel of debate {}: {} unchanged, {} updated, {} created, {} removed",
            debate.uuid, changes.unchanged.len(), changes.updated.len(), changes.created.len(), changes.removed.len()
        );
        Ok(())
    }
}

async fn save_debate_panel_handler(
    State(db): State<DatabaseConnection>,
    RequireSuperuser(user): RequireSuperuser,
    CurrentRound { tournament, round }: CurrentRound,
    Json(request): Json<SaveDebatesRequest>,
) -> Result<Json<Vec<DragAndDropDebate>>, APIError> {
    user.check_can_administer(tournament.uuid)?;

    let debate_ids = request.debates.iter().map(|d| d.id).collect_vec();
    let debates = save_drag_and_drop_debates(&DebatePanelSaver, &db, &user, &tournament, &round, request).await?;
    tracing::info!("Saved panels of {} debates in {}", debate_ids.len(), round.name);
    Ok(Json(debates))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/t/:tournament_slug/admin/round/:round_seq/adjudicators/", get(edit_allocation_handler))
        .route("/t/:tournament_slug/admin/round/:round_seq/adjudicators/auto", post(create_auto_allocation_handler))
        .route("/t/:tournament_slug/admin/round/:round_seq/adjudicators/importance", post(save_debate_importance_handler))
        .route("/t/:tournament_slug/admin/round/:round_seq/adjudicators/panel", post(save_debate_panel_handler))
}
