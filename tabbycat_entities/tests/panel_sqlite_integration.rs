mod common;

use assert_matches::assert_matches;
use sea_orm::prelude::*;
use tabbycat_entities::derived_models::AllocationDraw;
use tabbycat_entities::domain::debate_adjudicator::PanelError;
use tabbycat_entities::prelude::*;


fn member(adjudicator: u128, position: AdjudicatorPosition) -> PanelMember {
    PanelMember { adjudicator_id: Uuid::from_u128(adjudicator), position }
}

#[tokio::test]
async fn test_apply_panel_creates_allocations() -> Result<(), anyhow::Error> {
    let (db, mock) = common::set_up_mock_db().await?;
    let debate = mock.debates[0].uuid;

    let changes = DebateAdjudicator::apply_panel(&db, debate, &[
        member(3000, AdjudicatorPosition::Chair),
        member(3001, AdjudicatorPosition::Panellist),
    ]).await?;

    assert_eq!(changes.created, vec![Uuid::from_u128(3000), Uuid::from_u128(3001)]);
    let panel = DebateAdjudicator::get_all_in_debate(&db, debate).await?;
    assert_eq!(panel.len(), 2);
    assert_eq!(panel[0].position, AdjudicatorPosition::Chair);
    assert_eq!(panel[0].adjudicator_id, Uuid::from_u128(3000));
    Ok(())
}

#[tokio::test]
async fn test_apply_panel_skips_updates_and_removes() -> Result<(), anyhow::Error> {
    let (db, mock) = common::set_up_mock_db().await?;
    let debate = mock.debates[0].uuid;

    DebateAdjudicator::apply_panel(&db, debate, &[
        member(3000, AdjudicatorPosition::Chair),
        member(3001, AdjudicatorPosition::Panellist),
        member(3002, AdjudicatorPosition::Panellist),
    ]).await?;

    let changes = DebateAdjudicator::apply_panel(&db, debate, &[
        member(3000, AdjudicatorPosition::Chair),
        member(3001, AdjudicatorPosition::Trainee),
        member(3003, AdjudicatorPosition::Panellist),
    ]).await?;

    assert_eq!(changes.unchanged, vec![Uuid::from_u128(3000)]);
    assert_eq!(changes.updated, vec![Uuid::from_u128(3001)]);
    assert_eq!(changes.created, vec![Uuid::from_u128(3003)]);
    assert_eq!(changes.removed, vec![Uuid::from_u128(3002)]);

    let panel = DebateAdjudicator::get_all_in_debate(&db, debate).await?;
    let positions = panel.iter().map(|a| (a.adjudicator_id, a.position)).collect::<Vec<_>>();
    assert_eq!(positions, vec![
        (Uuid::from_u128(3000), AdjudicatorPosition::Chair),
        (Uuid::from_u128(3003), AdjudicatorPosition::Panellist),
        (Uuid::from_u128(3001), AdjudicatorPosition::Trainee),
    ]);
    Ok(())
}

#[tokio::test]
async fn test_apply_empty_panel_clears_debate() -> Result<(), anyhow::Error> {
    let (db, mock) = common::set_up_mock_db().await?;
    let debate = mock.debates[1].uuid;

    DebateAdjudicator::apply_panel(&db, debate, &[member(3004, AdjudicatorPosition::Chair)]).await?;
    let changes = DebateAdjudicator::apply_panel(&db, debate, &[]).await?;

    assert_eq!(changes.removed, vec![Uuid::from_u128(3004)]);
    assert!(DebateAdjudicator::get_all_in_debate(&db, debate).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_apply_panel_rejects_unknown_adjudicator() -> Result<(), anyhow::Error> {
    let (db, mock) = common::set_up_mock_db().await?;

    let result = DebateAdjudicator::apply_panel(&db, mock.debates[0].uuid, &[member(9999, AdjudicatorPosition::Chair)]).await;
    assert_matches!(result, Err(PanelError::UnknownAdjudicator(id)) if id == Uuid::from_u128(9999));
    Ok(())
}

#[tokio::test]
async fn test_apply_panel_rejects_duplicates() -> Result<(), anyhow::Error> {
    let (db, mock) = common::set_up_mock_db().await?;

    let result = DebateAdjudicator::apply_panel(&db, mock.debates[0].uuid, &[
        member(3000, AdjudicatorPosition::Chair),
        member(3000, AdjudicatorPosition::Panellist),
    ]).await;
    assert_matches!(result, Err(PanelError::DuplicateAdjudicator(_)));
    Ok(())
}

#[tokio::test]
async fn test_unused_adjudicators_exclude_allocated() -> Result<(), anyhow::Error> {
    let (db, mock) = common::set_up_mock_db().await?;
    let round = &mock.rounds[0];

    assert_eq!(round.unused_adjudicators(&db).await?.len(), 12);

    DebateAdjudicator::apply_panel(&db, mock.debates[0].uuid, &[member(3000, AdjudicatorPosition::Chair)]).await?;
    let unused = round.unused_adjudicators(&db).await?;
    assert_eq!(unused.len(), 11);
    assert!(unused.iter().all(|a| a.uuid != Uuid::from_u128(3000)));
    Ok(())
}

#[tokio::test]
async fn test_unused_adjudicators_require_availability() -> Result<(), anyhow::Error> {
    let (db, mock) = common::set_up_mock_db().await?;

    assert!(mock.rounds[1].unused_adjudicators(&db).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_replace_for_debates_drops_old_allocations() -> Result<(), anyhow::Error> {
    let (db, mock) = common::set_up_mock_db().await?;
    let debate_ids = mock.debates.iter().map(|d| d.uuid).collect::<Vec<_>>();

    DebateAdjudicator::apply_panel(&db, debate_ids[0], &[member(3000, AdjudicatorPosition::Chair)]).await?;
    DebateAdjudicator::replace_for_debates(&db, debate_ids.clone(), vec![
        DebateAdjudicator {
            uuid: Uuid::new_v4(),
            debate_id: debate_ids[1],
            adjudicator_id: Uuid::from_u128(3005),
            position: AdjudicatorPosition::Chair,
        }
    ]).await?;

    assert!(DebateAdjudicator::get_all_in_debate(&db, debate_ids[0]).await?.is_empty());
    let panel = DebateAdjudicator::get_all_in_debate(&db, debate_ids[1]).await?;
    assert_eq!(panel.len(), 1);
    assert_eq!(panel[0].adjudicator_id, Uuid::from_u128(3005));
    Ok(())
}

#[tokio::test]
async fn test_allocation_draw_annotates_region_classes() -> Result<(), anyhow::Error> {
    let (db, mock) = common::set_up_mock_db().await?;
    DebateAdjudicator::apply_panel(&db, mock.debates[0].uuid, &[
        member(3000, AdjudicatorPosition::Chair),
        member(3001, AdjudicatorPosition::Panellist),
    ]).await?;

    let draw = AllocationDraw::load_for_round(&db, &mock.rounds[0]).await?;

    assert_eq!(draw.regions.iter().map(|r| (r.name.as_str(), r.class)).collect::<Vec<_>>(), vec![("North", 0), ("South", 1)]);
    assert_eq!(draw.categories.iter().map(|c| c.slug.as_str()).collect::<Vec<_>>(), vec!["open", "esl"]);
    assert_eq!(draw.debates.len(), 4);
    assert_eq!(draw.debates[0].panel.len(), 2);
    assert_eq!(draw.debates[0].teams.len(), 2);
    assert_eq!(draw.unallocated_adjudicators.len(), 10);

    // Adjudicator 2 is from institution 2, which lies in the first region.
    let adjudicator = draw.unallocated_adjudicators.iter().find(|a| a.adjudicator.id == Uuid::from_u128(3002)).unwrap();
    assert_eq!(adjudicator.region_class, Some(0));
    Ok(())
}
