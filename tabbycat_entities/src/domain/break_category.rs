use sea_orm::{prelude::*, QueryOrder};
use serde::{Serialize, Deserialize};

use crate::schema;


#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct BreakCategory {
    pub uuid: Uuid,
    pub tournament_id: Uuid,
    pub name: String,
    pub slug: String,
    pub seq: i32,
    pub is_general: bool,
}

impl BreakCategory {
    pub async fn get_all_in_tournament<C>(db: &C, tournament_id: Uuid) -> Result<Vec<BreakCategory>, DbErr> where C: ConnectionTrait {
        let categories = schema::break_category::Entity::find()
            .filter(schema::break_category::Column::TournamentId.eq(tournament_id))
            .order_by_asc(schema::break_category::Column::Seq)
            .all(db)
            .await?;
        Ok(categories.into_iter().map(|c| BreakCategory {
            uuid: c.uuid,
            tournament_id: c.tournament_id,
            name: c.name,
            slug: c.slug,
            seq: c.seq,
            is_general: c.is_general,
        }).collect())
    }
}
