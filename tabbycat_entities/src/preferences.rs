use std::collections::{BTreeMap, HashMap};

use sea_orm::{prelude::*, ActiveValue, IntoActiveModel};
use serde::{Serialize, Deserialize};
use serde_json::Value;
use thiserror::Error;

use crate::schema;


/// Upper bound for the allocation penalties.
pub const MAX_PENALTY: i64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    AdjMinScore,
    AdjMaxScore,
    AdjMinVotingScore,
    DuplicateAdjs,
    AdjConflictPenalty,
    AdjHistoryPenalty,
    PublicDraw,
    PublicParticipants,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceKind {
    Bool,
    Float,
    Int,
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Unknown preference {0}")]
    UnknownPreference(String),
    #[error("Preference {key} expects a value of type {expected:?}, got {value}")]
    InvalidValue { key: &'static str, expected: PreferenceKind, value: Value },
    #[error("Preference {key} must be between {min} and {max}, got {value}")]
    OutOfRange { key: &'static str, min: i64, max: i64, value: Value },
    #[error(transparent)]
    DbErr(#[from] DbErr),
}

impl Preference {
    pub const ALL: [Preference; 8] = [
        Preference::AdjMinScore,
        Preference::AdjMaxScore,
        Preference::AdjMinVotingScore,
        Preference::DuplicateAdjs,
        Preference::AdjConflictPenalty,
        Preference::AdjHistoryPenalty,
        Preference::PublicDraw,
        Preference::PublicParticipants,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Preference::AdjMinScore => "adj_min_score",
            Preference::AdjMaxScore => "adj_max_score",
            Preference::AdjMinVotingScore => "adj_min_voting_score",
            Preference::DuplicateAdjs => "duplicate_adjs",
            Preference::AdjConflictPenalty => "adj_conflict_penalty",
            Preference::AdjHistoryPenalty => "adj_history_penalty",
            Preference::PublicDraw => "public_draw",
            Preference::PublicParticipants => "public_participants",
        }
    }

    pub fn kind(&self) -> PreferenceKind {
        match self {
            Preference::AdjMinScore | Preference::AdjMaxScore | Preference::AdjMinVotingScore => PreferenceKind::Float,
            Preference::AdjConflictPenalty | Preference::AdjHistoryPenalty => PreferenceKind::Int,
            Preference::DuplicateAdjs | Preference::PublicDraw | Preference::PublicParticipants => PreferenceKind::Bool,
        }
    }

    pub fn default_value(&self) -> Value {
        match self {
            Preference::AdjMinScore => Value::from(0.0),
            Preference::AdjMaxScore => Value::from(5.0),
            Preference::AdjMinVotingScore => Value::from(1.5),
            Preference::DuplicateAdjs => Value::from(false),
            Preference::AdjConflictPenalty => Value::from(1_000_000),
            Preference::AdjHistoryPenalty => Value::from(10_000),
            Preference::PublicDraw => Value::from(false),
            Preference::PublicParticipants => Value::from(false),
        }
    }

    pub fn from_key(key: &str) -> Result<Self, PreferenceError> {
        Preference::ALL.iter().find(|p| p.key() == key).copied().ok_or_else(|| PreferenceError::UnknownPreference(key.to_string()))
    }

    /// Inclusive bounds for integer preferences.
    pub fn int_range(&self) -> Option<(i64, i64)> {
        match self {
            Preference::AdjConflictPenalty | Preference::AdjHistoryPenalty => Some((0, MAX_PENALTY)),
            _ => None,
        }
    }

    pub fn validate(&self, value: &Value) -> Result<(), PreferenceError> {
        let valid = match self.kind() {
            PreferenceKind::Bool => value.is_boolean(),
            PreferenceKind::Float => value.is_number(),
            PreferenceKind::Int => value.is_i64(),
        };
        if !valid {
            return Err(PreferenceError::InvalidValue { key: self.key(), expected: self.kind(), value: value.clone() });
        }

        if let (Some((min, max)), Some(v)) = (self.int_range(), value.as_i64()) {
            if !(min..=max).contains(&v) {
                return Err(PreferenceError::OutOfRange { key: self.key(), min, max, value: value.clone() });
            }
        }
        Ok(())
    }
}


/// Tournament options, falling back to the defaults for anything not stored.
#[derive(Debug, Clone)]
pub struct Preferences {
    pub tournament_id: Uuid,
    values: HashMap<Preference, Value>,
}

impl Preferences {
    pub fn defaults(tournament_id: Uuid) -> Self {
        Preferences { tournament_id, values: HashMap::new() }
    }

    pub async fn load<C>(db: &C, tournament_id: Uuid) -> Result<Self, DbErr> where C: ConnectionTrait {
        let stored = schema::tournament_preference::Entity::find()
            .filter(schema::tournament_preference::Column::TournamentId.eq(tournament_id))
            .all(db)
            .await?;

        let mut values = HashMap::new();
        for model in stored {
            let pref = match Preference::from_key(&model.key) {
                Ok(pref) => pref,
                Err(_) => {
                    tracing::warn!("Ignoring unknown stored preference {}", model.key);
                    continue;
                }
            };
            match serde_json::from_str::<Value>(&model.value) {
                Ok(value) if pref.validate(&value).is_ok() => {
                    values.insert(pref, value);
                },
                _ => {
                    tracing::warn!("Ignoring invalid stored value {} for preference {}", model.value, model.key);
                }
            }
        }

        Ok(Preferences { tournament_id, values })
    }

    pub fn get(&self, pref: Preference) -> Value {
        self.values.get(&pref).cloned().unwrap_or_else(|| pref.default_value())
    }

    pub fn pref_bool(&self, pref: Preference) -> bool {
        self.get(pref).as_bool().unwrap_or(false)
    }

    pub fn pref_f64(&self, pref: Preference) -> f64 {
        self.get(pref).as_f64().unwrap_or(0.0)
    }

    pub fn pref_i64(&self, pref: Preference) -> i64 {
        self.get(pref).as_i64().unwrap_or(0)
    }

    pub fn as_map(&self) -> BTreeMap<String, Value> {
        Preference::ALL.iter().map(|p| (p.key().to_string(), self.get(*p))).collect()
    }

    pub async fn set<C>(&mut self, db: &C, pref: Preference, value: Value) -> Result<(), PreferenceError> where C: ConnectionTrait {
        pref.validate(&value)?;

        let existing = schema::tournament_preference::Entity::find()
            .filter(
                schema::tournament_preference::Column::TournamentId.eq(self.tournament_id)
                .and(schema::tournament_preference::Column::Key.eq(pref.key()))
            )
            .one(db)
            .await?;

        let serialized = value.to_string();
        match existing {
            Some(model) => {
                let mut model = model.into_active_model();
                model.value = ActiveValue::Set(serialized);
                model.update(db).await?;
            },
            None => {
                schema::tournament_preference::ActiveModel {
                    uuid: ActiveValue::Set(Uuid::new_v4()),
                    tournament_id: ActiveValue::Set(self.tournament_id),
                    key: ActiveValue::Set(pref.key().to_string()),
                    value: ActiveValue::Set(serialized),
                }.insert(db).await?;
            }
        }

        self.values.insert(pref, value);
        Ok(())
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_are_used_when_nothing_is_stored() {
        let prefs = Preferences::defaults(Uuid::from_u128(1));
        assert_eq!(prefs.pref_f64(Preference::AdjMaxScore), 5.0);
        assert_eq!(prefs.pref_f64(Preference::AdjMinVotingScore), 1.5);
        assert_eq!(prefs.pref_i64(Preference::AdjConflictPenalty), 1_000_000);
        assert!(!prefs.pref_bool(Preference::PublicDraw));
    }

    #[test]
    fn test_float_preference_accepts_integers() {
        assert!(Preference::AdjMaxScore.validate(&Value::from(10)).is_ok());
    }

    #[test]
    fn test_bool_preference_rejects_numbers() {
        assert!(Preference::PublicDraw.validate(&Value::from(1)).is_err());
    }

    #[test]
    fn test_penalties_must_be_in_range() {
        assert!(Preference::AdjConflictPenalty.validate(&Value::from(MAX_PENALTY)).is_ok());
        assert!(Preference::AdjHistoryPenalty.validate(&Value::from(0)).is_ok());
        assert!(matches!(
            Preference::AdjConflictPenalty.validate(&Value::from(MAX_PENALTY + 1)),
            Err(PreferenceError::OutOfRange { .. })
        ));
        assert!(matches!(
            Preference::AdjHistoryPenalty.validate(&Value::from(-1)),
            Err(PreferenceError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(matches!(Preference::from_key("show_emoji"), Err(PreferenceError::UnknownPreference(_))));
    }

    #[test]
    fn test_all_keys_round_trip() {
        for pref in Preference::ALL {
            assert_eq!(Preference::from_key(pref.key()).unwrap(), pref);
        }
    }
}
