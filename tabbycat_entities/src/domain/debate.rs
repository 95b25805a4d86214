use sea_orm::{prelude::*, ActiveValue, QueryOrder};
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::schema;

pub const MIN_IMPORTANCE: i32 = -2;
pub const MAX_IMPORTANCE: i32 = 2;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Importance must be between {min} and {max}, got {0}", min = MIN_IMPORTANCE, max = MAX_IMPORTANCE)]
pub struct InvalidImportance(pub i32);


#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Debate {
    pub uuid: Uuid,
    pub round_id: Uuid,
    pub room_rank: i32,
    pub bracket: f64,
    pub importance: i32,
}

impl Debate {
    pub fn new(round_id: Uuid, room_rank: i32) -> Self {
        Debate {
            uuid: Uuid::new_v4(),
            round_id,
            room_rank,
            bracket: 0.0,
            importance: 0,
        }
    }

    pub fn from_model(model: schema::debate::Model) -> Self {
        Debate {
            uuid: model.uuid,
            round_id: model.round_id,
            room_rank: model.room_rank,
            bracket: model.bracket,
            importance: model.importance,
        }
    }

    pub async fn get<C>(db: &C, uuid: Uuid) -> Result<Option<Debate>, DbErr> where C: ConnectionTrait {
        let model = schema::debate::Entity::find_by_id(uuid).one(db).await?;
        Ok(model.map(Debate::from_model))
    }

    pub async fn get_all_in_round<C>(db: &C, round_id: Uuid) -> Result<Vec<Debate>, DbErr> where C: ConnectionTrait {
        let debates = schema::debate::Entity::find()
            .filter(schema::debate::Column::RoundId.eq(round_id))
            .order_by_asc(schema::debate::Column::RoomRank)
            .all(db)
            .await?;
        Ok(debates.into_iter().map(Debate::from_model).collect())
    }

    pub fn set_importance(&mut self, importance: i32) -> Result<(), InvalidImportance> {
        if !(MIN_IMPORTANCE..=MAX_IMPORTANCE).contains(&importance) {
            return Err(InvalidImportance(importance));
        }
        self.importance = importance;
        Ok(())
    }

    pub async fn save<C>(&self, db: &C, guarantee_insert: bool) -> Result<(), DbErr> where C: ConnectionTrait {
        let model = schema::debate::ActiveModel {
            uuid: ActiveValue::Set(self.uuid),
            round_id: ActiveValue::Set(self.round_id),
            room_rank: ActiveValue::Set(self.room_rank),
            bracket: ActiveValue::Set(self.bracket),
            importance: ActiveValue::Set(self.importance),
        };
        if guarantee_insert {
            model.insert(db).await?;
        }
        else {
            let existing_model = schema::debate::Entity::find_by_id(self.uuid).one(db).await?;
            if existing_model.is_some() {
                model.update(db).await?;
            }
            else {
                model.insert(db).await?;
            }
        }
        Ok(())
    }
}
