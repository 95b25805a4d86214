use std::{collections::HashMap, str::FromStr};

use itertools::Itertools;
use sea_orm::{prelude::*, ActiveValue, IntoActiveModel};
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::schema;

use super::adjudicator::{AdjudicatorPosition, PositionParseError};


#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct DebateAdjudicator {
    pub uuid: Uuid,
    pub debate_id: Uuid,
    pub adjudicator_id: Uuid,
    pub position: AdjudicatorPosition,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
pub struct PanelMember {
    pub adjudicator_id: Uuid,
    pub position: AdjudicatorPosition,
}

/// What happened to each adjudicator when a posted panel was applied to a debate.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct PanelChanges {
    pub unchanged: Vec<Uuid>,
    pub updated: Vec<Uuid>,
    pub created: Vec<Uuid>,
    pub removed: Vec<Uuid>,
}

#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    DbErr(#[from] DbErr),
    #[error(transparent)]
    Position(#[from] PositionParseError),
    #[error("Adjudicator {0} does not exist")]
    UnknownAdjudicator(Uuid),
    #[error("Adjudicator {0} appears more than once in the panel")]
    DuplicateAdjudicator(Uuid),
}

impl DebateAdjudicator {
    pub fn try_from_model(model: schema::debate_adjudicator::Model) -> Result<Self, PositionParseError> {
        Ok(DebateAdjudicator {
            uuid: model.uuid,
            debate_id: model.debate_id,
            adjudicator_id: model.adjudicator_id,
            position: AdjudicatorPosition::from_str(&model.adj_type)?,
        })
    }

    pub async fn get_all_in_debate<C>(db: &C, debate_id: Uuid) -> Result<Vec<DebateAdjudicator>, PanelError> where C: ConnectionTrait {
        let mut by_debate = Self::get_for_debates(db, vec![debate_id]).await?;
        Ok(by_debate.remove(&debate_id).unwrap_or_default())
    }

    /// Allocations of each debate, chair first, then panellists, then trainees.
    pub async fn get_for_debates<C>(db: &C, debate_ids: Vec<Uuid>) -> Result<HashMap<Uuid, Vec<DebateAdjudicator>>, PanelError> where C: ConnectionTrait {
        let models = schema::debate_adjudicator::Entity::find()
            .filter(schema::debate_adjudicator::Column::DebateId.is_in(debate_ids))
            .all(db)
            .await?;

        let mut out: HashMap<Uuid, Vec<DebateAdjudicator>> = HashMap::new();
        for model in models {
            let allocation = DebateAdjudicator::try_from_model(model)?;
            out.entry(allocation.debate_id).or_default().push(allocation);
        }
        for allocations in out.values_mut() {
            allocations.sort_by_key(|a| a.position);
        }
        Ok(out)
    }

    /// Brings the debate's allocations in line with `panel`.
    ///
    /// Allocations that already match are left alone, allocations with a
    /// different position are changed in place, missing ones are created and
    /// any allocation of an adjudicator not in `panel` is deleted.
    pub async fn apply_panel<C>(db: &C, debate_id: Uuid, panel: &[PanelMember]) -> Result<PanelChanges, PanelError> where C: ConnectionTrait {
        let existing = schema::debate_adjudicator::Entity::find()
            .filter(schema::debate_adjudicator::Column::DebateId.eq(debate_id))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.adjudicator_id, m))
            .collect::<HashMap<_, _>>();

        if let Some(duplicate) = panel.iter().map(|m| m.adjudicator_id).duplicates().next() {
            return Err(PanelError::DuplicateAdjudicator(duplicate));
        }

        let mut changes = PanelChanges::default();

        for member in panel {
            tracing::debug!("Saving change for adjudicator {} in debate {}", member.adjudicator_id, debate_id);
            match existing.get(&member.adjudicator_id) {
                Some(current) if current.adj_type == member.position.as_str() => {
                    tracing::debug!("Skipping adjudicator {} as not changed", member.adjudicator_id);
                    changes.unchanged.push(member.adjudicator_id);
                },
                Some(current) => {
                    let mut model = current.clone().into_active_model();
                    model.adj_type = ActiveValue::Set(member.position.as_str().to_string());
                    model.update(db).await?;
                    tracing::debug!("Updating existing allocation of adjudicator {}", member.adjudicator_id);
                    changes.updated.push(member.adjudicator_id);
                },
                None => {
                    let adjudicator = schema::adjudicator::Entity::find_by_id(member.adjudicator_id).one(db).await?;
                    if adjudicator.is_none() {
                        return Err(PanelError::UnknownAdjudicator(member.adjudicator_id));
                    }
                    schema::debate_adjudicator::ActiveModel {
                        uuid: ActiveValue::Set(Uuid::new_v4()),
                        debate_id: ActiveValue::Set(debate_id),
                        adjudicator_id: ActiveValue::Set(member.adjudicator_id),
                        adj_type: ActiveValue::Set(member.position.as_str().to_string()),
                    }.insert(db).await?;
                    tracing::debug!("Creating new allocation of adjudicator {}", member.adjudicator_id);
                    changes.created.push(member.adjudicator_id);
                }
            }
        }

        let posted_ids = panel.iter().map(|m| m.adjudicator_id).collect_vec();
        changes.removed = existing.keys().filter(|id| !posted_ids.contains(id)).cloned().sorted().collect();

        schema::debate_adjudicator::Entity::delete_many()
            .filter(
                schema::debate_adjudicator::Column::DebateId.eq(debate_id)
                .and(schema::debate_adjudicator::Column::AdjudicatorId.is_not_in(posted_ids))
            )
            .exec(db)
            .await?;

        Ok(changes)
    }

    /// Drops every allocation in the given debates and inserts `allocations` in their place.
    pub async fn replace_for_debates<C>(db: &C, debate_ids: Vec<Uuid>, allocations: Vec<DebateAdjudicator>) -> Result<(), DbErr> where C: ConnectionTrait {
        schema::debate_adjudicator::Entity::delete_many()
            .filter(schema::debate_adjudicator::Column::DebateId.is_in(debate_ids))
            .exec(db)
            .await?;

        if allocations.is_empty() {
            return Ok(());
        }

        schema::debate_adjudicator::Entity::insert_many(
            allocations.into_iter().map(|a| schema::debate_adjudicator::ActiveModel {
                uuid: ActiveValue::Set(a.uuid),
                debate_id: ActiveValue::Set(a.debate_id),
                adjudicator_id: ActiveValue::Set(a.adjudicator_id),
                adj_type: ActiveValue::Set(a.position.as_str().to_string()),
            })
        ).exec(db).await?;

        Ok(())
    }
}
