use std::{collections::HashMap, fmt::Display, str::FromStr};

use itertools::Itertools;
use sea_orm::{prelude::*, ActiveValue};
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::schema;


#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum AdjudicatorPosition {
    #[serde(rename = "C")]
    Chair,
    #[serde(rename = "P")]
    Panellist,
    #[serde(rename = "T")]
    Trainee,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown adjudicator position {0}")]
pub struct PositionParseError(pub String);

impl AdjudicatorPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjudicatorPosition::Chair => "C",
            AdjudicatorPosition::Panellist => "P",
            AdjudicatorPosition::Trainee => "T",
        }
    }
}

impl FromStr for AdjudicatorPosition {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(AdjudicatorPosition::Chair),
            "P" => Ok(AdjudicatorPosition::Panellist),
            "T" => Ok(AdjudicatorPosition::Trainee),
            _ => Err(PositionParseError(s.to_string()))
        }
    }
}

impl Display for AdjudicatorPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}


#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Adjudicator {
    pub uuid: Uuid,
    pub tournament_id: Option<Uuid>,
    pub institution_id: Option<Uuid>,
    pub name: String,
    pub base_score: f64,
    pub independent: bool,
    pub adj_core: bool,
}

impl From<schema::adjudicator::Model> for Adjudicator {
    fn from(model: schema::adjudicator::Model) -> Self {
        Adjudicator {
            uuid: model.uuid,
            tournament_id: model.tournament_id,
            institution_id: model.institution_id,
            name: model.name,
            base_score: model.base_score,
            independent: model.independent,
            adj_core: model.adj_core,
        }
    }
}

/// Teams and institutions an adjudicator may not judge.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AdjudicatorConflicts {
    pub teams: Vec<Uuid>,
    pub institutions: Vec<Uuid>,
}

impl Adjudicator {
    pub fn new(tournament_id: Option<Uuid>, name: String, base_score: f64) -> Self {
        Adjudicator {
            uuid: Uuid::new_v4(),
            tournament_id,
            institution_id: None,
            name,
            base_score,
            independent: false,
            adj_core: false,
        }
    }

    pub async fn get<C>(db: &C, uuid: Uuid) -> Result<Option<Adjudicator>, DbErr> where C: ConnectionTrait {
        let model = schema::adjudicator::Entity::find_by_id(uuid).one(db).await?;
        Ok(model.map(Adjudicator::from))
    }

    pub async fn get_many<C>(db: &C, uuids: Vec<Uuid>) -> Result<Vec<Adjudicator>, DbErr> where C: ConnectionTrait {
        let models = schema::adjudicator::Entity::find()
            .filter(schema::adjudicator::Column::Uuid.is_in(uuids))
            .all(db)
            .await?;
        Ok(models.into_iter().map(Adjudicator::from).collect())
    }

    /// Adjudicators of the tournament, plus shared adjudicators that belong to no tournament.
    pub async fn get_all_in_tournament<C>(db: &C, tournament_id: Uuid) -> Result<Vec<Adjudicator>, DbErr> where C: ConnectionTrait {
        let models = schema::adjudicator::Entity::find()
            .filter(
                schema::adjudicator::Column::TournamentId.eq(tournament_id)
                .or(schema::adjudicator::Column::TournamentId.is_null())
            )
            .all(db)
            .await?;
        Ok(models.into_iter().map(Adjudicator::from).sorted_by(|a, b| a.name.cmp(&b.name)).collect())
    }

    pub async fn get_all<C>(db: &C) -> Result<Vec<Adjudicator>, DbErr> where C: ConnectionTrait {
        let models = schema::adjudicator::Entity::find().all(db).await?;
        Ok(models.into_iter().map(Adjudicator::from).sorted_by(|a, b| a.name.cmp(&b.name)).collect())
    }

    pub async fn get_conflicts<C>(db: &C, adjudicator_ids: Vec<Uuid>) -> Result<HashMap<Uuid, AdjudicatorConflicts>, DbErr> where C: ConnectionTrait {
        let team_conflicts = schema::adjudicator_team_conflict::Entity::find()
            .filter(schema::adjudicator_team_conflict::Column::AdjudicatorId.is_in(adjudicator_ids.clone()))
            .all(db)
            .await?;
        let institution_conflicts = schema::adjudicator_institution_conflict::Entity::find()
            .filter(schema::adjudicator_institution_conflict::Column::AdjudicatorId.is_in(adjudicator_ids))
            .all(db)
            .await?;

        let mut out: HashMap<Uuid, AdjudicatorConflicts> = HashMap::new();
        for conflict in team_conflicts {
            out.entry(conflict.adjudicator_id).or_default().teams.push(conflict.team_id);
        }
        for conflict in institution_conflicts {
            out.entry(conflict.adjudicator_id).or_default().institutions.push(conflict.institution_id);
        }
        Ok(out)
    }

    pub async fn save<C>(&self, db: &C, guarantee_insert: bool) -> Result<(), DbErr> where C: ConnectionTrait {
        let model = schema::adjudicator::ActiveModel {
            uuid: ActiveValue::Set(self.uuid),
            tournament_id: ActiveValue::Set(self.tournament_id),
            institution_id: ActiveValue::Set(self.institution_id),
            name: ActiveValue::Set(self.name.clone()),
            base_score: ActiveValue::Set(self.base_score),
            independent: ActiveValue::Set(self.independent),
            adj_core: ActiveValue::Set(self.adj_core),
        };
        if guarantee_insert {
            model.insert(db).await?;
        }
        else {
            let existing_model = schema::adjudicator::Entity::find_by_id(self.uuid).one(db).await?;
            if existing_model.is_some() {
                model.update(db).await?;
            }
            else {
                model.insert(db).await?;
            }
        }
        Ok(())
    }

    pub async fn mark_available<C>(&self, db: &C, round_id: Uuid) -> Result<(), DbErr> where C: ConnectionTrait {
        let existing = schema::round_availability::Entity::find()
            .filter(
                schema::round_availability::Column::RoundId.eq(round_id)
                .and(schema::round_availability::Column::AdjudicatorId.eq(self.uuid))
            )
            .one(db)
            .await?;
        if existing.is_none() {
            schema::round_availability::ActiveModel {
                uuid: ActiveValue::Set(Uuid::new_v4()),
                round_id: ActiveValue::Set(round_id),
                adjudicator_id: ActiveValue::Set(self.uuid),
            }.insert(db).await?;
        }
        Ok(())
    }
}
