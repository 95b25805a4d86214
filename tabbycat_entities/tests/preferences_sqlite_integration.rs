mod common;

use assert_matches::assert_matches;
use serde_json::json;
use tabbycat_entities::preferences::PreferenceError;
use tabbycat_entities::prelude::*;


#[tokio::test]
async fn test_stored_preferences_override_defaults() -> Result<(), anyhow::Error> {
    let (db, mock) = common::set_up_mock_db().await?;
    let mut prefs = Preferences::load(&db, mock.tournament.uuid).await?;
    assert!(!prefs.pref_bool(Preference::PublicDraw));

    prefs.set(&db, Preference::PublicDraw, json!(true)).await?;
    prefs.set(&db, Preference::AdjMaxScore, json!(10.0)).await?;

    let reloaded = Preferences::load(&db, mock.tournament.uuid).await?;
    assert!(reloaded.pref_bool(Preference::PublicDraw));
    assert_eq!(reloaded.pref_f64(Preference::AdjMaxScore), 10.0);
    assert_eq!(reloaded.pref_f64(Preference::AdjMinVotingScore), 1.5);
    Ok(())
}

#[tokio::test]
async fn test_setting_twice_updates_in_place() -> Result<(), anyhow::Error> {
    let (db, mock) = common::set_up_mock_db().await?;
    let mut prefs = Preferences::load(&db, mock.tournament.uuid).await?;

    prefs.set(&db, Preference::AdjHistoryPenalty, json!(5)).await?;
    prefs.set(&db, Preference::AdjHistoryPenalty, json!(7)).await?;

    let reloaded = Preferences::load(&db, mock.tournament.uuid).await?;
    assert_eq!(reloaded.pref_i64(Preference::AdjHistoryPenalty), 7);
    Ok(())
}

#[tokio::test]
async fn test_wrong_type_is_rejected() -> Result<(), anyhow::Error> {
    let (db, mock) = common::set_up_mock_db().await?;
    let mut prefs = Preferences::load(&db, mock.tournament.uuid).await?;

    assert_matches!(prefs.set(&db, Preference::DuplicateAdjs, json!("yes")).await, Err(PreferenceError::InvalidValue { .. }));
    assert!(!prefs.pref_bool(Preference::DuplicateAdjs));
    Ok(())
}

#[tokio::test]
async fn test_map_lists_every_preference() -> Result<(), anyhow::Error> {
    let (db, mock) = common::set_up_mock_db().await?;
    let prefs = Preferences::load(&db, mock.tournament.uuid).await?;

    let map = prefs.as_map();
    assert_eq!(map.len(), 8);
    assert_eq!(map["adj_conflict_penalty"], json!(1_000_000));
    Ok(())
}
