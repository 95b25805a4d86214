use std::collections::HashMap;

use itertools::Itertools;
use sea_orm::prelude::*;
use serde::{Serialize, Deserialize};

use crate::domain::{
    adjudicator::{Adjudicator, AdjudicatorPosition},
    debate::Debate,
    region::Institution,
    round::TournamentRound,
    team::{DebateSide, Team},
    debate_adjudicator::DebateAdjudicator,
};

use super::LoadDrawError;


#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PublicTeamInfo {
    pub name: String,
    pub side: DebateSide,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PublicAdjudicatorInfo {
    pub name: String,
    pub position: AdjudicatorPosition,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PublicDebateInfo {
    pub room_rank: i32,
    pub teams: Vec<PublicTeamInfo>,
    pub adjudicators: Vec<PublicAdjudicatorInfo>,
}

/// The released draw of a round, with names only.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PublicDraw {
    pub round_name: String,
    pub debates: Vec<PublicDebateInfo>,
}

impl PublicDraw {
    pub async fn load_for_round<C>(db: &C, round: &TournamentRound) -> Result<Self, LoadDrawError> where C: ConnectionTrait {
        let debates = Debate::get_all_in_round(db, round.uuid).await?;
        let debate_ids = debates.iter().map(|d| d.uuid).collect_vec();
        let mut teams = Team::get_for_debates(db, debate_ids.clone()).await?;
        let mut panels = DebateAdjudicator::get_for_debates(db, debate_ids).await?;
        let adjudicator_names = Adjudicator::get_many(db, panels.values().flatten().map(|a| a.adjudicator_id).unique().collect()).await?
            .into_iter()
            .map(|a| (a.uuid, a.name))
            .collect::<HashMap<_, _>>();

        let debates = debates.into_iter().map(|debate| {
            PublicDebateInfo {
                room_rank: debate.room_rank,
                teams: teams.remove(&debate.uuid).unwrap_or_default().into_iter().map(|t| PublicTeamInfo { name: t.team.name, side: t.side }).collect(),
                adjudicators: panels.remove(&debate.uuid).unwrap_or_default().into_iter().filter_map(|a| {
                    adjudicator_names.get(&a.adjudicator_id).map(|name| PublicAdjudicatorInfo { name: name.clone(), position: a.position })
                }).collect(),
            }
        }).collect();

        Ok(PublicDraw { round_name: round.name.clone(), debates })
    }
}


#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ParticipantInfo {
    pub name: String,
    pub institution: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ParticipantList {
    pub adjudicators: Vec<ParticipantInfo>,
    pub teams: Vec<ParticipantInfo>,
}

impl ParticipantList {
    pub async fn load_for_tournament<C>(db: &C, tournament_id: Uuid) -> Result<Self, DbErr> where C: ConnectionTrait {
        let institutions = Institution::get_all_by_id(db).await?;
        let adjudicators = Adjudicator::get_all_in_tournament(db, tournament_id).await?;
        let teams = Team::get_all_in_tournament(db, tournament_id).await?;

        Ok(ParticipantList {
            adjudicators: adjudicators.into_iter().map(|a| participant(a.name, a.institution_id, &institutions)).collect(),
            teams: teams.into_iter().map(|t| participant(t.name, t.institution_id, &institutions)).collect(),
        })
    }

    /// Adjudicators of every tournament. Teams are not listed across tournaments.
    pub async fn load_all_adjudicators<C>(db: &C) -> Result<Self, DbErr> where C: ConnectionTrait {
        let institutions = Institution::get_all_by_id(db).await?;
        let adjudicators = Adjudicator::get_all(db).await?;

        Ok(ParticipantList {
            adjudicators: adjudicators.into_iter().map(|a| participant(a.name, a.institution_id, &institutions)).collect(),
            teams: vec![],
        })
    }
}

fn participant(name: String, institution_id: Option<Uuid>, institutions: &HashMap<Uuid, Institution>) -> ParticipantInfo {
    ParticipantInfo {
        name,
        institution: institution_id.and_then(|id| institutions.get(&id)).map(|i| i.name.clone()),
    }
}
