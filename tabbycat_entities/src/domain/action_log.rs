use std::str::FromStr;

use sea_orm::{prelude::*, ActiveValue, QueryOrder, QuerySelect};
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::schema;


#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
pub enum ActionLogType {
    #[serde(rename = "adjudicators.auto")]
    AdjudicatorsAuto,
    #[serde(rename = "adjudicators.save")]
    AdjudicatorsSave,
    #[serde(rename = "debate.importance.edit")]
    DebateImportanceEdit,
    #[serde(rename = "draw.status.edit")]
    DrawStatusEdit,
    #[serde(rename = "options.edit")]
    OptionsEdit,
    #[serde(rename = "attachment.upload")]
    AttachmentUpload,
    #[serde(rename = "attachment.delete")]
    AttachmentDelete,
}

#[derive(Debug, Error)]
#[error("Unknown action type {0}")]
pub struct ActionTypeParseError(pub String);

impl ActionLogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionLogType::AdjudicatorsAuto => "adjudicators.auto",
            ActionLogType::AdjudicatorsSave => "adjudicators.save",
            ActionLogType::DebateImportanceEdit => "debate.importance.edit",
            ActionLogType::DrawStatusEdit => "draw.status.edit",
            ActionLogType::OptionsEdit => "options.edit",
            ActionLogType::AttachmentUpload => "attachment.upload",
            ActionLogType::AttachmentDelete => "attachment.delete",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActionLogType::AdjudicatorsAuto => "Auto-allocated adjudicators",
            ActionLogType::AdjudicatorsSave => "Saved adjudicator allocation",
            ActionLogType::DebateImportanceEdit => "Edited debate importance",
            ActionLogType::DrawStatusEdit => "Changed draw status",
            ActionLogType::OptionsEdit => "Edited tournament options",
            ActionLogType::AttachmentUpload => "Uploaded attachment",
            ActionLogType::AttachmentDelete => "Deleted attachment",
        }
    }
}

impl FromStr for ActionLogType {
    type Err = ActionTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(|_| ActionTypeParseError(s.to_string()))
    }
}


#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct ActionLogEntry {
    pub uuid: Uuid,
    pub action_type: ActionLogType,
    pub user_id: Option<Uuid>,
    pub tournament_id: Uuid,
    pub round_id: Option<Uuid>,
    pub content: Option<String>,
    pub timestamp: chrono::NaiveDateTime,
}

impl ActionLogEntry {
    pub fn new(action_type: ActionLogType, user_id: Option<Uuid>, tournament_id: Uuid, round_id: Option<Uuid>, content: Option<String>) -> Self {
        ActionLogEntry {
            uuid: Uuid::new_v4(),
            action_type,
            user_id,
            tournament_id,
            round_id,
            content,
            timestamp: chrono::Utc::now().naive_utc(),
        }
    }

    pub async fn save<C>(&self, db: &C) -> Result<(), DbErr> where C: ConnectionTrait {
        schema::action_log_entry::ActiveModel {
            uuid: ActiveValue::Set(self.uuid),
            action_type: ActiveValue::Set(self.action_type.as_str().to_string()),
            user_id: ActiveValue::Set(self.user_id),
            tournament_id: ActiveValue::Set(self.tournament_id),
            round_id: ActiveValue::Set(self.round_id),
            content: ActiveValue::Set(self.content.clone()),
            timestamp: ActiveValue::Set(self.timestamp),
        }.insert(db).await?;
        Ok(())
    }

    pub async fn get_latest_for_tournament<C>(db: &C, tournament_id: Uuid, limit: u64) -> anyhow::Result<Vec<ActionLogEntry>> where C: ConnectionTrait {
        let entries = schema::action_log_entry::Entity::find()
            .filter(schema::action_log_entry::Column::TournamentId.eq(tournament_id))
            .order_by_desc(schema::action_log_entry::Column::Timestamp)
            .limit(limit)
            .all(db)
            .await?;

        entries.into_iter().map(|e| -> anyhow::Result<ActionLogEntry> {
            Ok(ActionLogEntry {
                uuid: e.uuid,
                action_type: ActionLogType::from_str(&e.action_type)?,
                user_id: e.user_id,
                tournament_id: e.tournament_id,
                round_id: e.round_id,
                content: e.content,
                timestamp: e.timestamp,
            })
        }).collect()
    }
}
