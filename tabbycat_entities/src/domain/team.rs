use std::collections::HashMap;

use itertools::Itertools;
use sea_orm::prelude::*;
use serde::{Serialize, Deserialize};

use crate::schema;


#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy, Hash)]
pub enum DebateSide {
    #[serde(rename = "aff")]
    Affirmative,
    #[serde(rename = "neg")]
    Negative,
}

impl DebateSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebateSide::Affirmative => "aff",
            DebateSide::Negative => "neg",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "neg" => DebateSide::Negative,
            _ => DebateSide::Affirmative,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Team {
    pub uuid: Uuid,
    pub tournament_id: Uuid,
    pub institution_id: Option<Uuid>,
    pub name: String,
}

impl From<schema::team::Model> for Team {
    fn from(model: schema::team::Model) -> Self {
        Team {
            uuid: model.uuid,
            tournament_id: model.tournament_id,
            institution_id: model.institution_id,
            name: model.name,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct DebateTeam {
    pub team: Team,
    pub side: DebateSide,
}

impl Team {
    pub async fn get_all_in_tournament<C>(db: &C, tournament_id: Uuid) -> Result<Vec<Team>, DbErr> where C: ConnectionTrait {
        let teams = schema::team::Entity::find()
            .filter(schema::team::Column::TournamentId.eq(tournament_id))
            .all(db)
            .await?;
        Ok(teams.into_iter().map(Team::from).sorted_by(|a, b| a.name.cmp(&b.name)).collect())
    }

    /// Teams of each debate, affirmative first.
    pub async fn get_for_debates<C>(db: &C, debate_ids: Vec<Uuid>) -> Result<HashMap<Uuid, Vec<DebateTeam>>, DbErr> where C: ConnectionTrait {
        let debate_teams = schema::debate_team::Entity::find()
            .filter(schema::debate_team::Column::DebateId.is_in(debate_ids))
            .find_also_related(schema::team::Entity)
            .all(db)
            .await?;

        let mut out: HashMap<Uuid, Vec<DebateTeam>> = HashMap::new();
        for (debate_team, team) in debate_teams {
            if let Some(team) = team {
                out.entry(debate_team.debate_id).or_default().push(DebateTeam {
                    team: team.into(),
                    side: DebateSide::from_str_lossy(&debate_team.side),
                });
            }
        }
        for teams in out.values_mut() {
            teams.sort_by_key(|t| t.side == DebateSide::Negative);
        }
        Ok(out)
    }
}
