use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "debate_adjudicator")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    pub debate_id: Uuid,
    pub adjudicator_id: Uuid,
    #[sea_orm(column_name = "type")]
    pub adj_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::debate::Entity",
        from = "Column::DebateId",
        to = "super::debate::Column::Uuid",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Debate,
    #[sea_orm(
        belongs_to = "super::adjudicator::Entity",
        from = "Column::AdjudicatorId",
        to = "super::adjudicator::Column::Uuid",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Adjudicator,
}

impl Related<super::debate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debate.def()
    }
}

impl Related<super::adjudicator::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adjudicator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
