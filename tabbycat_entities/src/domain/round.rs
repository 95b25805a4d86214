use std::{collections::HashSet, fmt::Display, str::FromStr};

use itertools::Itertools;
use sea_orm::{prelude::*, ActiveValue};
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::schema;

use super::adjudicator::Adjudicator;


#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy, Hash)]
pub enum DrawStatus {
    #[serde(rename = "N")]
    None,
    #[serde(rename = "D")]
    Draft,
    #[serde(rename = "C")]
    Confirmed,
    #[serde(rename = "R")]
    Released,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown draw status {0}")]
pub struct DrawStatusParseError(pub String);

impl DrawStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawStatus::None => "N",
            DrawStatus::Draft => "D",
            DrawStatus::Confirmed => "C",
            DrawStatus::Released => "R",
        }
    }

    pub fn can_transition_to(&self, target: DrawStatus) -> bool {
        if *self == target {
            return true;
        }
        matches!(
            (self, target),
            (DrawStatus::None, DrawStatus::Draft)
            | (DrawStatus::Draft, DrawStatus::Confirmed)
            | (DrawStatus::Confirmed, DrawStatus::Draft)
            | (DrawStatus::Confirmed, DrawStatus::Released)
            | (DrawStatus::Released, DrawStatus::Confirmed)
        )
    }
}

impl FromStr for DrawStatus {
    type Err = DrawStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" => Ok(DrawStatus::None),
            "D" => Ok(DrawStatus::Draft),
            "C" => Ok(DrawStatus::Confirmed),
            "R" => Ok(DrawStatus::Released),
            _ => Err(DrawStatusParseError(s.to_string()))
        }
    }
}

impl Display for DrawStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RoundLoadError {
    #[error(transparent)]
    DbErr(#[from] DbErr),
    #[error(transparent)]
    DrawStatus(#[from] DrawStatusParseError),
}


#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct TournamentRound {
    pub uuid: Uuid,
    pub tournament_id: Uuid,
    pub seq: i32,
    pub name: String,
    pub abbreviation: String,
    pub draw_status: DrawStatus,
}

impl TournamentRound {
    pub fn new(tournament_id: Uuid, seq: i32) -> Self {
        TournamentRound {
            uuid: Uuid::new_v4(),
            tournament_id,
            seq,
            name: format!("Round {}", seq),
            abbreviation: format!("R{}", seq),
            draw_status: DrawStatus::None,
        }
    }

    pub fn from_model(model: schema::round::Model) -> Result<Self, DrawStatusParseError> {
        Ok(TournamentRound {
            uuid: model.uuid,
            tournament_id: model.tournament_id,
            seq: model.seq,
            name: model.name,
            abbreviation: model.abbreviation,
            draw_status: DrawStatus::from_str(&model.draw_status)?,
        })
    }

    pub async fn get<C>(db: &C, uuid: Uuid) -> Result<Option<TournamentRound>, RoundLoadError> where C: ConnectionTrait {
        let model = schema::round::Entity::find_by_id(uuid).one(db).await?;
        Ok(model.map(TournamentRound::from_model).transpose()?)
    }

    pub async fn get_by_seq<C>(db: &C, tournament_id: Uuid, seq: i32) -> Result<Option<TournamentRound>, RoundLoadError> where C: ConnectionTrait {
        let model = schema::round::Entity::find()
            .filter(
                schema::round::Column::TournamentId.eq(tournament_id)
                .and(schema::round::Column::Seq.eq(seq))
            )
            .one(db)
            .await?;
        Ok(model.map(TournamentRound::from_model).transpose()?)
    }

    pub async fn save<C>(&self, db: &C, guarantee_insert: bool) -> Result<(), DbErr> where C: ConnectionTrait {
        let model = schema::round::ActiveModel {
            uuid: ActiveValue::Set(self.uuid),
            tournament_id: ActiveValue::Set(self.tournament_id),
            seq: ActiveValue::Set(self.seq),
            name: ActiveValue::Set(self.name.clone()),
            abbreviation: ActiveValue::Set(self.abbreviation.clone()),
            draw_status: ActiveValue::Set(self.draw_status.as_str().to_string()),
        };
        if guarantee_insert {
            model.insert(db).await?;
        }
        else {
            let existing_model = schema::round::Entity::find_by_id(self.uuid).one(db).await?;
            if existing_model.is_some() {
                model.update(db).await?;
            }
            else {
                model.insert(db).await?;
            }
        }
        Ok(())
    }

    pub async fn debate_ids<C>(&self, db: &C) -> Result<Vec<Uuid>, DbErr> where C: ConnectionTrait {
        let debates = schema::debate::Entity::find()
            .filter(schema::debate::Column::RoundId.eq(self.uuid))
            .all(db)
            .await?;
        Ok(debates.into_iter().map(|d| d.uuid).collect())
    }

    /// Adjudicators available for this round who sit on no panel in it.
    pub async fn unused_adjudicators<C>(&self, db: &C) -> Result<Vec<Adjudicator>, DbErr> where C: ConnectionTrait {
        let available_ids = schema::round_availability::Entity::find()
            .filter(schema::round_availability::Column::RoundId.eq(self.uuid))
            .all(db)
            .await?
            .into_iter()
            .map(|a| a.adjudicator_id)
            .collect_vec();

        let debate_ids = self.debate_ids(db).await?;
        let allocated_ids: HashSet<Uuid> = schema::debate_adjudicator::Entity::find()
            .filter(schema::debate_adjudicator::Column::DebateId.is_in(debate_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|da| da.adjudicator_id)
            .collect();

        let unused_ids = available_ids.into_iter().filter(|id| !allocated_ids.contains(id)).collect_vec();

        let mut adjudicators = Adjudicator::get_many(db, unused_ids).await?;
        adjudicators.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(adjudicators)
    }
}
