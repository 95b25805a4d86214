use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use sea_orm::prelude::*;
use serde::{Serialize, Deserialize};

use tabbycat_entities::prelude::*;
use tabbycat_entities::domain::team::Team;
use tabbycat_entities::schema;


#[derive(Debug, Clone)]
pub struct AdjudicatorInfo {
    pub id: Uuid,
    pub score: f64,
    pub institution_id: Option<Uuid>,
    pub independent: bool,
    pub team_conflicts: HashSet<Uuid>,
    pub institution_conflicts: HashSet<Uuid>,
}

impl AdjudicatorInfo {
    pub fn new(id: Uuid, score: f64) -> Self {
        AdjudicatorInfo {
            id,
            score,
            institution_id: None,
            independent: false,
            team_conflicts: HashSet::new(),
            institution_conflicts: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TeamInfo {
    pub id: Uuid,
    pub institution_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct DebateInfo {
    pub id: Uuid,
    pub importance: i32,
    pub room_rank: i32,
    pub teams: Vec<TeamInfo>,
}

/// Everything an allocator gets to see about one round.
#[derive(Debug, Clone, Default)]
pub struct AllocationInput {
    pub debates: Vec<DebateInfo>,
    pub adjudicators: Vec<AdjudicatorInfo>,
    /// How often an adjudicator has judged a team in earlier rounds, keyed by (adjudicator, team).
    pub history: HashMap<(Uuid, Uuid), u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelAssignment {
    pub debate_id: Uuid,
    pub adjudicator_id: Uuid,
    pub position: AdjudicatorPosition,
}

impl AllocationInput {
    pub async fn load_for_round<C>(db: &C, round: &TournamentRound) -> Result<Self, DbErr> where C: ConnectionTrait {
        let debates = Debate::get_all_in_round(db, round.uuid).await?;
        let mut teams = Team::get_for_debates(db, debates.iter().map(|d| d.uuid).collect()).await?;
        let debates = debates.into_iter().map(|debate| DebateInfo {
            id: debate.uuid,
            importance: debate.importance,
            room_rank: debate.room_rank,
            teams: teams.remove(&debate.uuid).unwrap_or_default().into_iter().map(|t| TeamInfo {
                id: t.team.uuid,
                institution_id: t.team.institution_id,
            }).collect(),
        }).collect_vec();

        let available_ids = schema::round_availability::Entity::find()
            .filter(schema::round_availability::Column::RoundId.eq(round.uuid))
            .all(db)
            .await?
            .into_iter()
            .map(|a| a.adjudicator_id)
            .collect_vec();
        let mut conflicts = Adjudicator::get_conflicts(db, available_ids.clone()).await?;
        let adjudicators = Adjudicator::get_many(db, available_ids).await?
            .into_iter()
            .sorted_by_key(|a| a.uuid)
            .map(|adjudicator| {
                let adj_conflicts = conflicts.remove(&adjudicator.uuid).unwrap_or_default();
                AdjudicatorInfo {
                    id: adjudicator.uuid,
                    score: adjudicator.base_score,
                    institution_id: adjudicator.institution_id,
                    independent: adjudicator.independent,
                    team_conflicts: adj_conflicts.teams.into_iter().collect(),
                    institution_conflicts: adj_conflicts.institutions.into_iter().collect(),
                }
            }).collect_vec();

        let history = load_history(db, round).await?;

        Ok(AllocationInput { debates, adjudicators, history })
    }
}

async fn load_history<C>(db: &C, round: &TournamentRound) -> Result<HashMap<(Uuid, Uuid), u32>, DbErr> where C: ConnectionTrait {
    let earlier_round_ids = schema::round::Entity::find()
        .filter(
            schema::round::Column::TournamentId.eq(round.tournament_id)
            .and(schema::round::Column::Seq.lt(round.seq))
        )
        .all(db)
        .await?
        .into_iter()
        .map(|r| r.uuid)
        .collect_vec();

    if earlier_round_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let debate_ids = schema::debate::Entity::find()
        .filter(schema::debate::Column::RoundId.is_in(earlier_round_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|d| d.uuid)
        .collect_vec();

    let mut teams_by_debate: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for debate_team in schema::debate_team::Entity::find()
        .filter(schema::debate_team::Column::DebateId.is_in(debate_ids.clone()))
        .all(db)
        .await? {
        teams_by_debate.entry(debate_team.debate_id).or_default().push(debate_team.team_id);
    }

    let allocations = schema::debate_adjudicator::Entity::find()
        .filter(schema::debate_adjudicator::Column::DebateId.is_in(debate_ids))
        .all(db)
        .await?;

    let mut history = HashMap::new();
    for allocation in allocations {
        for team_id in teams_by_debate.get(&allocation.debate_id).into_iter().flatten() {
            *history.entry((allocation.adjudicator_id, *team_id)).or_insert(0) += 1;
        }
    }
    Ok(history)
}
