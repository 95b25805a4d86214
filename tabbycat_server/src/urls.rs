use thiserror::Error;

use tabbycat_entities::prelude::*;


#[derive(Debug, Error, PartialEq, Eq)]
#[error("Reverse for '{0}' not found")]
pub struct NoReverseMatch(pub String);

/// Route name and path template for everything addressed by tournament only.
const TOURNAMENT_ROUTES: &[(&str, &str)] = &[
    ("tournament-public-index", "/t/{slug}/"),
    ("tournament-public-participants", "/t/{slug}/participants"),
    ("tournament-admin-options", "/t/{slug}/admin/options"),
    ("tournament-admin-actionlog", "/t/{slug}/admin/actionlog"),
];

/// Route name and path template for everything addressed by tournament and round.
const ROUND_ROUTES: &[(&str, &str)] = &[
    ("tournament-public-draw", "/t/{slug}/round/{seq}/draw"),
    ("round-index", "/t/{slug}/admin/round/{seq}/"),
    ("adjudicators-edit", "/t/{slug}/admin/round/{seq}/adjudicators/"),
    ("adjudicators-auto-allocate", "/t/{slug}/admin/round/{seq}/adjudicators/auto"),
    ("save-debate-panel", "/t/{slug}/admin/round/{seq}/adjudicators/panel"),
    ("save-debate-importance", "/t/{slug}/admin/round/{seq}/adjudicators/importance"),
    ("draw-status-edit", "/t/{slug}/admin/round/{seq}/draw/status"),
];

fn find_route(routes: &[(&str, &'static str)], name: &str) -> Result<&'static str, NoReverseMatch> {
    routes.iter()
        .find(|(route_name, _)| *route_name == name)
        .map(|(_, template)| *template)
        .ok_or_else(|| NoReverseMatch(name.to_string()))
}

pub fn reverse_tournament(name: &str, tournament: &Tournament) -> Result<String, NoReverseMatch> {
    let template = find_route(TOURNAMENT_ROUTES, name)?;
    Ok(template.replace("{slug}", &tournament.slug))
}

pub fn reverse_round(name: &str, tournament: &Tournament, round: &TournamentRound) -> Result<String, NoReverseMatch> {
    let template = find_route(ROUND_ROUTES, name)?;
    Ok(template.replace("{slug}", &tournament.slug).replace("{seq}", &round.seq.to_string()))
}


#[cfg(test)]
mod test {
    use sea_orm::prelude::Uuid;

    use super::*;

    fn fixtures() -> (Tournament, TournamentRound) {
        let tournament = Tournament::new("bp".into(), "BP Open".into());
        let round = TournamentRound::new(Uuid::from_u128(1), 3);
        (tournament, round)
    }

    #[test]
    fn test_reverse_tournament_route() {
        let (tournament, _) = fixtures();
        assert_eq!(reverse_tournament("tournament-public-index", &tournament).unwrap(), "/t/bp/");
    }

    #[test]
    fn test_reverse_round_route() {
        let (tournament, round) = fixtures();
        assert_eq!(reverse_round("save-debate-importance", &tournament, &round).unwrap(), "/t/bp/admin/round/3/adjudicators/importance");
    }

    #[test]
    fn test_round_route_needs_round() {
        let (tournament, _) = fixtures();
        assert_eq!(reverse_tournament("adjudicators-edit", &tournament), Err(NoReverseMatch("adjudicators-edit".into())));
    }

    #[test]
    fn test_unknown_route() {
        let (tournament, round) = fixtures();
        assert!(reverse_round("results-entry", &tournament, &round).is_err());
    }
}
