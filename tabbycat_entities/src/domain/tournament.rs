use sea_orm::{prelude::*, ActiveValue, QueryOrder};
use serde::{Serialize, Deserialize};

use crate::schema;


#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Tournament {
    pub uuid: Uuid,
    pub slug: String,
    pub name: String,
    pub seq: i32,
    pub active: bool,
}

impl Tournament {
    pub fn new(slug: String, name: String) -> Self {
        Tournament {
            uuid: Uuid::new_v4(),
            slug,
            name,
            seq: 0,
            active: true,
        }
    }

    pub fn from_model(model: schema::tournament::Model) -> Self {
        Tournament {
            uuid: model.uuid,
            slug: model.slug,
            name: model.name,
            seq: model.seq,
            active: model.active,
        }
    }

    pub async fn get<C>(db: &C, uuid: Uuid) -> Result<Option<Tournament>, DbErr> where C: ConnectionTrait {
        let model = schema::tournament::Entity::find_by_id(uuid).one(db).await?;
        Ok(model.map(Tournament::from_model))
    }

    pub async fn get_by_slug<C>(db: &C, slug: &str) -> Result<Option<Tournament>, DbErr> where C: ConnectionTrait {
        let model = schema::tournament::Entity::find()
            .filter(schema::tournament::Column::Slug.eq(slug))
            .one(db)
            .await?;
        Ok(model.map(Tournament::from_model))
    }

    /// The tournament whose settings govern pages that span all tournaments.
    pub async fn get_first<C>(db: &C) -> Result<Option<Tournament>, DbErr> where C: ConnectionTrait {
        let model = schema::tournament::Entity::find()
            .order_by_asc(schema::tournament::Column::Seq)
            .order_by_asc(schema::tournament::Column::Slug)
            .one(db)
            .await?;
        Ok(model.map(Tournament::from_model))
    }

    pub async fn get_all<C>(db: &C) -> Result<Vec<Tournament>, DbErr> where C: ConnectionTrait {
        let models = schema::tournament::Entity::find()
            .order_by_asc(schema::tournament::Column::Seq)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Tournament::from_model).collect())
    }

    pub async fn save<C>(&self, db: &C, guarantee_insert: bool) -> Result<(), DbErr> where C: ConnectionTrait {
        let model = schema::tournament::ActiveModel {
            uuid: ActiveValue::Set(self.uuid),
            slug: ActiveValue::Set(self.slug.clone()),
            name: ActiveValue::Set(self.name.clone()),
            seq: ActiveValue::Set(self.seq),
            active: ActiveValue::Set(self.active),
        };
        if guarantee_insert {
            model.insert(db).await?;
        }
        else {
            let existing_model = schema::tournament::Entity::find_by_id(self.uuid).one(db).await?;
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
