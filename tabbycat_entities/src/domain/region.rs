use std::collections::HashMap;

use sea_orm::{prelude::*, QueryOrder};
use serde::{Serialize, Deserialize};

use crate::schema;


#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Region {
    pub uuid: Uuid,
    pub name: String,
    pub seq: i32,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Institution {
    pub uuid: Uuid,
    pub name: String,
    pub code: String,
    pub region_id: Option<Uuid>,
}

impl Region {
    pub async fn get_all_ordered<C>(db: &C) -> Result<Vec<Region>, DbErr> where C: ConnectionTrait {
        let regions = schema::region::Entity::find()
            .order_by_asc(schema::region::Column::Seq)
            .order_by_asc(schema::region::Column::Name)
            .all(db)
            .await?;
        Ok(regions.into_iter().map(|r| Region { uuid: r.uuid, name: r.name, seq: r.seq }).collect())
    }
}

impl Institution {
    pub async fn get_all_by_id<C>(db: &C) -> Result<HashMap<Uuid, Institution>, DbErr> where C: ConnectionTrait {
        let institutions = schema::institution::Entity::find().all(db).await?;
        Ok(institutions.into_iter().map(|i| (i.uuid, Institution {
            uuid: i.uuid,
            name: i.name,
            code: i.code,
            region_id: i.region_id,
        })).collect())
    }

    pub async fn get_by_code<C>(db: &C, code: &str) -> Result<Option<Institution>, DbErr> where C: ConnectionTrait {
        let institution = schema::institution::Entity::find()
            .filter(schema::institution::Column::Code.eq(code))
            .one(db)
            .await?;
        Ok(institution.map(|i| Institution { uuid: i.uuid, name: i.name, code: i.code, region_id: i.region_id }))
    }
}
