use tracing_test::traced_test;

use tabbycat_entities::{mock, prelude::*};
use tabbycat_server::{commands::import_adjudicators, state::AppState};


#[tokio::test]
#[traced_test]
async fn test_import_adjudicators_from_csv() {
    let state = AppState::new_test_app().await;
    let mock = mock::make_mock_tournament(&state.db).await.unwrap();

    let csv = "name,institution_code,score,independent\nAda Lovelace,I1,4.5,yes\nAlan Turing,,2.0,\n";
    let imported = import_adjudicators(&state.db, &mock.tournament, csv.as_bytes()).await.unwrap();
    assert_eq!(imported.len(), 2);

    let all = Adjudicator::get_all_in_tournament(&state.db, mock.tournament.uuid).await.unwrap();
    assert_eq!(all.len(), 14);

    let ada = all.iter().find(|a| a.name == "Ada Lovelace").unwrap();
    assert_eq!(ada.institution_id, Some(mock.institutions[1]));
    assert_eq!(ada.base_score, 4.5);
    assert!(ada.independent);

    let alan = all.iter().find(|a| a.name == "Alan Turing").unwrap();
    assert_eq!(alan.institution_id, None);
    assert!(!alan.independent);
}

#[tokio::test]
#[traced_test]
async fn test_import_with_unknown_institution_imports_nothing() {
    let state = AppState::new_test_app().await;
    let mock = mock::make_mock_tournament(&state.db).await.unwrap();

    let csv = "name,institution_code,score,independent\nAda Lovelace,I1,4.5,yes\nAlan Turing,XYZ,2.0,no\n";
    let result = import_adjudicators(&state.db, &mock.tournament, csv.as_bytes()).await;
    assert!(result.is_err());

    let all = Adjudicator::get_all_in_tournament(&state.db, mock.tournament.uuid).await.unwrap();
    assert_eq!(all.len(), 12);
}
