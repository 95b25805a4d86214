use std::collections::HashMap;

use itertools::Itertools;
use sea_orm::prelude::*;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::domain::{
    adjudicator::{Adjudicator, AdjudicatorPosition},
    break_category::BreakCategory,
    debate::Debate,
    debate_adjudicator::{DebateAdjudicator, PanelError},
    region::{Institution, Region},
    round::TournamentRound,
    team::{DebateSide, Team},
};


#[derive(Debug, Error)]
pub enum LoadDrawError {
    #[error(transparent)]
    DbErr(#[from] DbErr),
    #[error(transparent)]
    Panel(#[from] PanelError),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RegionInfo {
    pub id: Uuid,
    pub name: String,
    pub class: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CategoryInfo {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub class: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InstitutionInfo {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub region: Option<Uuid>,
}

impl From<&Institution> for InstitutionInfo {
    fn from(institution: &Institution) -> Self {
        InstitutionInfo {
            id: institution.uuid,
            name: institution.name.clone(),
            code: institution.code.clone(),
            region: institution.region_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AdjudicatorInfo {
    pub id: Uuid,
    pub name: String,
    pub score: f64,
    pub institution: Option<InstitutionInfo>,
    pub region: Option<Uuid>,
    pub independent: bool,
    pub adj_core: bool,
}

impl AdjudicatorInfo {
    pub fn from_adjudicator(adjudicator: &Adjudicator, institutions: &HashMap<Uuid, Institution>) -> Self {
        let institution = adjudicator.institution_id.and_then(|id| institutions.get(&id));
        AdjudicatorInfo {
            id: adjudicator.uuid,
            name: adjudicator.name.clone(),
            score: adjudicator.base_score,
            institution: institution.map(InstitutionInfo::from),
            region: institution.and_then(|i| i.region_id),
            independent: adjudicator.independent,
            adj_core: adjudicator.adj_core,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UnallocatedAdjudicatorInfo {
    #[serde(flatten)]
    pub adjudicator: AdjudicatorInfo,
    pub region_class: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TeamInfo {
    pub id: Uuid,
    pub name: String,
    pub side: DebateSide,
    pub institution: Option<InstitutionInfo>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PanelMemberInfo {
    pub adjudicator: AdjudicatorInfo,
    pub position: AdjudicatorPosition,
}

/// A debate as shown on the allocation editor.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DragAndDropDebate {
    pub id: Uuid,
    pub bracket: f64,
    pub importance: i32,
    pub room_rank: i32,
    pub teams: Vec<TeamInfo>,
    pub panel: Vec<PanelMemberInfo>,
}

impl DragAndDropDebate {
    /// Serializes `debates` in the given order with their teams and panels.
    pub async fn load_many<C>(db: &C, debates: Vec<Debate>) -> Result<Vec<DragAndDropDebate>, LoadDrawError> where C: ConnectionTrait {
        let debate_ids = debates.iter().map(|d| d.uuid).collect_vec();
        let institutions = Institution::get_all_by_id(db).await?;
        let mut teams = Team::get_for_debates(db, debate_ids.clone()).await?;
        let mut panels = DebateAdjudicator::get_for_debates(db, debate_ids).await?;

        let adjudicator_ids = panels.values().flatten().map(|a| a.adjudicator_id).unique().collect_vec();
        let adjudicators = Adjudicator::get_many(db, adjudicator_ids).await?
            .into_iter()
            .map(|a| (a.uuid, AdjudicatorInfo::from_adjudicator(&a, &institutions)))
            .collect::<HashMap<_, _>>();

        Ok(debates.into_iter().map(|debate| {
            let teams = teams.remove(&debate.uuid).unwrap_or_default().into_iter().map(|t| TeamInfo {
                id: t.team.uuid,
                name: t.team.name,
                side: t.side,
                institution: t.team.institution_id.and_then(|id| institutions.get(&id)).map(InstitutionInfo::from),
            }).collect_vec();
            let panel = panels.remove(&debate.uuid).unwrap_or_default().into_iter().filter_map(|allocation| {
                adjudicators.get(&allocation.adjudicator_id).map(|adjudicator| PanelMemberInfo {
                    adjudicator: adjudicator.clone(),
                    position: allocation.position,
                })
            }).collect_vec();

            DragAndDropDebate {
                id: debate.uuid,
                bracket: debate.bracket,
                importance: debate.importance,
                room_rank: debate.room_rank,
                teams,
                panel,
            }
        }).collect())
    }
}

/// Everything the allocation editor needs for one round.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AllocationDraw {
    pub regions: Vec<RegionInfo>,
    pub categories: Vec<CategoryInfo>,
    pub debates: Vec<DragAndDropDebate>,
    pub unallocated_adjudicators: Vec<UnallocatedAdjudicatorInfo>,
}

impl AllocationDraw {
    pub async fn load_for_round<C>(db: &C, round: &TournamentRound) -> Result<Self, LoadDrawError> where C: ConnectionTrait {
        let regions = load_regions(db).await?;
        let categories = BreakCategory::get_all_in_tournament(db, round.tournament_id).await?
            .into_iter()
            .enumerate()
            .map(|(class, c)| CategoryInfo { id: c.uuid, name: c.name, slug: c.slug, class })
            .collect_vec();
        let debates = DragAndDropDebate::load_many(db, Debate::get_all_in_round(db, round.uuid).await?).await?;
        let unallocated_adjudicators = load_unallocated_adjudicators(db, round, &regions).await?;

        Ok(AllocationDraw { regions, categories, debates, unallocated_adjudicators })
    }
}

pub async fn load_regions<C>(db: &C) -> Result<Vec<RegionInfo>, DbErr> where C: ConnectionTrait {
    Ok(
        Region::get_all_ordered(db).await?
            .into_iter()
            .enumerate()
            .map(|(class, r)| RegionInfo { id: r.uuid, name: r.name, class })
            .collect()
    )
}

/// Adjudicators available in the round but not on any of its panels.
pub async fn load_unallocated_adjudicators<C>(db: &C, round: &TournamentRound, regions: &[RegionInfo]) -> Result<Vec<UnallocatedAdjudicatorInfo>, DbErr> where C: ConnectionTrait {
    let institutions = Institution::get_all_by_id(db).await?;
    let region_classes = regions.iter().map(|r| (r.id, r.class)).collect::<HashMap<_, _>>();

    Ok(round.unused_adjudicators(db).await?.iter().map(|adjudicator| {
        let info = AdjudicatorInfo::from_adjudicator(adjudicator, &institutions);
        let region_class = info.region.and_then(|r| region_classes.get(&r).copied());
        UnallocatedAdjudicatorInfo { adjudicator: info, region_class }
    }).collect())
}
