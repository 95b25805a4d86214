use itertools::Itertools;
use sea_orm::prelude::*;
use thiserror::Error;

use tabbycat_entities::domain::round::RoundLoadError;
use tabbycat_entities::prelude::*;

use crate::datastructures::{AllocationInput, PanelAssignment};


#[derive(Debug, Error)]
pub enum AllocationError {
    #[error(transparent)]
    DbErr(#[from] DbErr),
    #[error(transparent)]
    RoundLoad(#[from] RoundLoadError),
    #[error("Round {0} does not exist")]
    UnknownRound(Uuid),
    #[error("Invalid allocation preferences: {0}")]
    InvalidPreferences(String),
    #[error("Only {assigned} of {expected} adjudicators could be placed")]
    IncompleteAssignment { expected: usize, assigned: usize },
}

pub trait Allocator: Send + Sync {
    fn allocate(&self, input: &AllocationInput) -> Result<Vec<PanelAssignment>, AllocationError>;
}

/// Runs `allocator` on the round and replaces every existing allocation of its debates with the result.
pub async fn allocate_adjudicators<C>(db: &C, round_id: Uuid, allocator: &dyn Allocator) -> Result<Vec<PanelAssignment>, AllocationError> where C: ConnectionTrait {
    let round = TournamentRound::get(db, round_id).await?.ok_or(AllocationError::UnknownRound(round_id))?;
    let input = AllocationInput::load_for_round(db, &round).await?;

    let assignments = allocator.allocate(&input)?;
    tracing::info!("Allocated {} adjudicators in round {}", assignments.len(), round.name);

    DebateAdjudicator::replace_for_debates(
        db,
        input.debates.iter().map(|d| d.id).collect_vec(),
        assignments.iter().map(|a| DebateAdjudicator {
            uuid: Uuid::new_v4(),
            debate_id: a.debate_id,
            adjudicator_id: a.adjudicator_id,
            position: a.position,
        }).collect_vec()
    ).await?;

    Ok(assignments)
}
