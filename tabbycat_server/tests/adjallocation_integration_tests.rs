mod common;

use sea_orm::prelude::Uuid;
use serde_json::{json, Value};
use tracing_test::traced_test;

use tabbycat_entities::derived_models::allocation_draw::DragAndDropDebate;
use tabbycat_entities::prelude::*;
use tabbycat_server::adjallocation::AutoAllocationResponse;
use tabbycat_server::response::APIErrorResponse;

use crate::common::{Auth, FixtureOptions};

use assert_matches::assert_matches;

const ROUND_URL: &str = "/t/test/admin/round/1";


#[tokio::test]
#[traced_test]
async fn test_edit_page_contains_round_info() {
    let mut fixture = common::Fixture::default().await;

    let mut response = fixture.get(&format!("{}/adjudicators/", ROUND_URL)).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await;

    let round_info = &body["round_info"];
    assert_eq!(round_info["updateImportanceURL"], "/t/test/admin/round/1/adjudicators/importance");
    assert_eq!(round_info["autoAllocationURL"], "/t/test/admin/round/1/adjudicators/auto");
    assert_eq!(round_info["saveURL"], "/t/test/admin/round/1/adjudicators/panel");
    assert_eq!(round_info["scoreMin"], 0.0);
    assert_eq!(round_info["scoreMax"], 5.0);
    assert_eq!(round_info["scoreForVote"], 1.5);
    assert_eq!(round_info["allowDuplicateAllocations"], false);

    let regions = round_info["regions"].as_array().unwrap();
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0]["name"], "North");
    assert_eq!(regions[0]["class"], 0);
    assert_eq!(regions[1]["class"], 1);

    let categories = round_info["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[1]["slug"], "esl");
    assert_eq!(categories[1]["class"], 1);

    assert_eq!(body["debates"].as_array().unwrap().len(), 4);
    let unallocated = body["unallocatedAdjudicators"].as_array().unwrap();
    assert_eq!(unallocated.len(), 12);
    assert_matches!(unallocated[0]["region_class"].as_u64(), Some(0 | 1));

    assert_eq!(body["page_title"], "Edit Adjudicator Allocation");
    assert_eq!(body["page_subtitle"], "as of Round 1");
}

#[tokio::test]
#[traced_test]
async fn test_edit_page_requires_credentials() {
    let mut fixture = common::Fixture::default().await.with_auth(Auth::None);
    let response = fixture.get(&format!("{}/adjudicators/", ROUND_URL)).await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[traced_test]
async fn test_edit_page_requires_superuser() {
    let mut fixture = common::Fixture::new(FixtureOptions {
        use_regular_user: true,
        ..Default::default()
    }).await;
    let response = fixture.get(&format!("{}/adjudicators/", ROUND_URL)).await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[traced_test]
async fn test_unknown_round_is_not_found() {
    let mut fixture = common::Fixture::default().await;
    let response = fixture.get("/t/test/admin/round/9/adjudicators/").await;
    assert_eq!(response.status(), 404);
    let response = fixture.get("/t/nope/admin/round/1/adjudicators/").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[traced_test]
async fn test_auto_allocation_fills_panels() {
    let mut fixture = common::Fixture::default().await;

    let mut response = fixture.post_json_no_body(&format!("{}/adjudicators/auto", ROUND_URL)).await;
    assert_eq!(response.status(), 200);
    let body: AutoAllocationResponse = response.json().await;

    assert_eq!(body.debates.len(), 4);
    for debate in body.debates.iter() {
        let chairs = debate.panel.iter().filter(|p| p.position == AdjudicatorPosition::Chair).count();
        assert_eq!(chairs, 1);
    }
    let allocated: usize = body.debates.iter().map(|d| d.panel.len()).sum();
    assert_eq!(allocated, 8);
    assert_eq!(body.unallocated_adjudicators.len(), 4);

    let log = ActionLogEntry::get_latest_for_tournament(&fixture.db, fixture.tournament_id(), 10).await.unwrap();
    assert_eq!(log[0].action_type, ActionLogType::AdjudicatorsAuto);
}

#[tokio::test]
#[traced_test]
async fn test_auto_allocation_rejects_released_draw() {
    let mut fixture = common::Fixture::new(FixtureOptions {
        draw_status: DrawStatus::Released,
        ..Default::default()
    }).await;

    let mut response = fixture.post_json_no_body(&format!("{}/adjudicators/auto", ROUND_URL)).await;
    assert_eq!(response.status(), 400);
    let body: APIErrorResponse = response.json().await;
    assert_eq!(body.message, "Draw is already released, unrelease draw to redo auto-allocations.");
}

#[tokio::test]
#[traced_test]
async fn test_auto_allocation_rejects_unconfirmed_draw() {
    let mut fixture = common::Fixture::new(FixtureOptions {
        draw_status: DrawStatus::Draft,
        ..Default::default()
    }).await;

    let mut response = fixture.post_json_no_body(&format!("{}/adjudicators/auto", ROUND_URL)).await;
    assert_eq!(response.status(), 400);
    let body: APIErrorResponse = response.json().await;
    assert_eq!(body.message, "Draw is not confirmed, confirm draw to run auto-allocations.");

    let allocations = DebateAdjudicator::get_all_in_debate(&fixture.db, Uuid::from_u128(200)).await.unwrap();
    assert!(allocations.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_save_importance() {
    let mut fixture = common::Fixture::default().await;
    let debate_id = Uuid::from_u128(201).to_string();

    let response = fixture.post_form(
        &format!("{}/adjudicators/importance", ROUND_URL),
        &[("debate_id", debate_id.as_str()), ("importance", "2")]
    ).await;
    assert_eq!(response.status(), 200);

    let debate = Debate::get(&fixture.db, Uuid::from_u128(201)).await.unwrap().unwrap();
    assert_eq!(debate.importance, 2);

    let log = ActionLogEntry::get_latest_for_tournament(&fixture.db, fixture.tournament_id(), 10).await.unwrap();
    assert_eq!(log[0].action_type, ActionLogType::DebateImportanceEdit);
}

#[tokio::test]
#[traced_test]
async fn test_save_importance_out_of_range_is_rejected() {
    let mut fixture = common::Fixture::default().await;
    let debate_id = Uuid::from_u128(201).to_string();

    for importance in ["3", "-3", "high"] {
        let response = fixture.post_form(
            &format!("{}/adjudicators/importance", ROUND_URL),
            &[("debate_id", debate_id.as_str()), ("importance", importance)]
        ).await;
        assert_eq!(response.status(), 400);
    }

    let debate = Debate::get(&fixture.db, Uuid::from_u128(201)).await.unwrap().unwrap();
    assert_eq!(debate.importance, 0);
}

#[tokio::test]
#[traced_test]
async fn test_save_importance_of_unknown_or_foreign_debate() {
    let mut fixture = common::Fixture::default().await;

    let unknown = Uuid::from_u128(299).to_string();
    let response = fixture.post_form(
        &format!("{}/adjudicators/importance", ROUND_URL),
        &[("debate_id", unknown.as_str()), ("importance", "1")]
    ).await;
    assert_eq!(response.status(), 404);

    let debate_id = Uuid::from_u128(200).to_string();
    let response = fixture.post_form(
        "/t/test/admin/round/2/adjudicators/importance",
        &[("debate_id", debate_id.as_str()), ("importance", "1")]
    ).await;
    assert_eq!(response.status(), 400);
}

fn panellist(id: u128, position: &str) -> Value {
    json!({"adjudicator": {"id": Uuid::from_u128(id), "name": format!("Adjudicator {}", id - 3000)}, "position": position})
}

#[tokio::test]
#[traced_test]
async fn test_save_panel_creates_updates_and_removes() {
    let mut fixture = common::Fixture::default().await;
    let url = format!("{}/adjudicators/panel", ROUND_URL);

    let mut response = fixture.post_json(&url, json!({
        "moved_item": Uuid::from_u128(3001),
        "debates": [{"id": Uuid::from_u128(200), "panel": [panellist(3001, "C"), panellist(3002, "P")]}]
    })).await;
    assert_eq!(response.status(), 200);
    let debates: Vec<DragAndDropDebate> = response.json().await;
    assert_eq!(debates.len(), 1);
    assert_eq!(debates[0].panel.len(), 2);
    assert_eq!(debates[0].panel[0].adjudicator.id, Uuid::from_u128(3001));
    assert_eq!(debates[0].panel[0].position, AdjudicatorPosition::Chair);

    let before = DebateAdjudicator::get_all_in_debate(&fixture.db, Uuid::from_u128(200)).await.unwrap();
    let chair_allocation = before.iter().find(|a| a.adjudicator_id == Uuid::from_u128(3001)).unwrap().uuid;

    let response = fixture.post_json(&url, json!({
        "moved_item": Uuid::from_u128(3002),
        "debates": [{"id": Uuid::from_u128(200), "panel": [panellist(3001, "P"), panellist(3003, "C")]}]
    })).await;
    assert_eq!(response.status(), 200);

    let after = DebateAdjudicator::get_all_in_debate(&fixture.db, Uuid::from_u128(200)).await.unwrap();
    assert_eq!(after.len(), 2);
    let moved = after.iter().find(|a| a.adjudicator_id == Uuid::from_u128(3001)).unwrap();
    assert_eq!(moved.uuid, chair_allocation);
    assert_eq!(moved.position, AdjudicatorPosition::Panellist);
    assert!(after.iter().all(|a| a.adjudicator_id != Uuid::from_u128(3002)));

    let log = ActionLogEntry::get_latest_for_tournament(&fixture.db, fixture.tournament_id(), 10).await.unwrap();
    assert_eq!(log[0].action_type, ActionLogType::AdjudicatorsSave);
}

#[tokio::test]
#[traced_test]
async fn test_save_panel_with_invalid_position_changes_nothing() {
    let mut fixture = common::Fixture::default().await;
    let url = format!("{}/adjudicators/panel", ROUND_URL);

    let response = fixture.post_json(&url, json!({
        "debates": [
            {"id": Uuid::from_u128(200), "panel": [panellist(3001, "C")]},
            {"id": Uuid::from_u128(201), "panel": [panellist(3002, "X")]}
        ]
    })).await;
    assert_eq!(response.status(), 400);

    let allocations = DebateAdjudicator::get_all_in_debate(&fixture.db, Uuid::from_u128(200)).await.unwrap();
    assert!(allocations.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_save_panel_with_unknown_items() {
    let mut fixture = common::Fixture::default().await;
    let url = format!("{}/adjudicators/panel", ROUND_URL);

    let response = fixture.post_json(&url, json!({
        "moved_item": Uuid::from_u128(3999),
        "debates": []
    })).await;
    assert_eq!(response.status(), 404);

    let response = fixture.post_json(&url, json!({
        "debates": [{"id": Uuid::from_u128(299), "panel": []}]
    })).await;
    assert_eq!(response.status(), 404);

    let response = fixture.post_json(&url, json!({
        "debates": [{"id": Uuid::from_u128(200), "panel": [panellist(3999, "C")]}]
    })).await;
    assert_eq!(response.status(), 404);
}
