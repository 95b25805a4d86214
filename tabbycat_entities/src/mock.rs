use itertools::Itertools;
use sea_orm::{prelude::*, ActiveValue};

use faker_rand::en_us::{names::FullName, company::CompanyName};

use crate::prelude::*;
use crate::schema;


#[derive(Debug, Clone)]
pub struct MockOption {
    pub deterministic_uuids: bool,
    pub num_debates: u32,
    pub num_adjudicators: u32,
    pub use_random_names: bool,
    pub draw_status: DrawStatus,
}

impl Default for MockOption {
    fn default() -> Self {
        Self {
            deterministic_uuids: true,
            num_debates: 4,
            num_adjudicators: 12,
            use_random_names: false,
            draw_status: DrawStatus::Confirmed,
        }
    }
}

/// Ids of what [`make_mock_tournament_with_options`] inserted.
#[derive(Debug, Clone)]
pub struct MockTournament {
    pub tournament: Tournament,
    pub rounds: Vec<TournamentRound>,
    pub debates: Vec<Debate>,
    pub teams: Vec<Uuid>,
    pub institutions: Vec<Uuid>,
    pub regions: Vec<Uuid>,
    pub adjudicators: Vec<Adjudicator>,
}

pub async fn make_mock_tournament<C>(db: &C) -> Result<MockTournament, DbErr> where C: ConnectionTrait {
    make_mock_tournament_with_options(db, Default::default()).await
}

pub async fn make_mock_tournament_with_options<C>(db: &C, options: MockOption) -> Result<MockTournament, DbErr> where C: ConnectionTrait {
    /*
    Tournament: 1
    Regions: 10
    Rounds: 100
    Debates: 200
    Break categories: 400
    Institutions: 500
    Teams: 1000
    Adjudicators: 3000
    */
    let id = |base: u128, i: u32| if options.deterministic_uuids { Uuid::from_u128(base + i as u128) } else { Uuid::new_v4() };

    let tournament = Tournament {
        uuid: id(1, 0),
        slug: "test".into(),
        name: "Test Open".into(),
        seq: 1,
        active: true,
    };
    tournament.save(db, true).await?;

    let regions = (0..2).map(|i| id(10, i)).collect_vec();
    for (seq, (uuid, name)) in regions.iter().zip(["North", "South"]).enumerate() {
        schema::region::ActiveModel {
            uuid: ActiveValue::Set(*uuid),
            name: ActiveValue::Set(name.to_string()),
            seq: ActiveValue::Set(seq as i32),
        }.insert(db).await?;
    }

    for (seq, (name, slug)) in [("Open", "open"), ("ESL", "esl")].into_iter().enumerate() {
        schema::break_category::ActiveModel {
            uuid: ActiveValue::Set(id(400, seq as u32)),
            tournament_id: ActiveValue::Set(tournament.uuid),
            name: ActiveValue::Set(name.to_string()),
            slug: ActiveValue::Set(slug.to_string()),
            seq: ActiveValue::Set(seq as i32),
            is_general: ActiveValue::Set(seq == 0),
        }.insert(db).await?;
    }

    let num_institutions = options.num_debates.max(1);
    let institutions = (0..num_institutions).map(|i| id(500, i)).collect_vec();
    for (i, uuid) in institutions.iter().enumerate() {
        let name = if options.use_random_names {
            rand::random::<CompanyName>().to_string()
        }
        else {
            format!("Institution {}", i)
        };
        schema::institution::ActiveModel {
            uuid: ActiveValue::Set(*uuid),
            name: ActiveValue::Set(name),
            code: ActiveValue::Set(format!("I{}", i)),
            region_id: ActiveValue::Set(Some(regions[i % regions.len()])),
        }.insert(db).await?;
    }

    let teams = (0..options.num_debates * 2).map(|i| id(1000, i)).collect_vec();
    for (i, uuid) in teams.iter().enumerate() {
        schema::team::ActiveModel {
            uuid: ActiveValue::Set(*uuid),
            tournament_id: ActiveValue::Set(tournament.uuid),
            institution_id: ActiveValue::Set(Some(institutions[i % institutions.len()])),
            name: ActiveValue::Set(format!("Team {}", i)),
        }.insert(db).await?;
    }

    let mut first_round = TournamentRound::new(tournament.uuid, 1);
    first_round.uuid = id(100, 0);
    first_round.draw_status = options.draw_status;
    first_round.save(db, true).await?;

    let mut second_round = TournamentRound::new(tournament.uuid, 2);
    second_round.uuid = id(100, 1);
    second_round.save(db, true).await?;

    let debates = (0..options.num_debates).map(|i| Debate {
        uuid: id(200, i),
        round_id: first_round.uuid,
        room_rank: i as i32 + 1,
        bracket: (options.num_debates - i) as f64,
        importance: 0,
    }).collect_vec();
    for (debate, debate_teams) in debates.iter().zip(teams.chunks(2)) {
        debate.save(db, true).await?;
        for (team, side) in debate_teams.iter().zip(["aff", "neg"]) {
            schema::debate_team::ActiveModel {
                uuid: ActiveValue::Set(Uuid::new_v4()),
                debate_id: ActiveValue::Set(debate.uuid),
                team_id: ActiveValue::Set(*team),
                side: ActiveValue::Set(side.to_string()),
            }.insert(db).await?;
        }
    }

    let adjudicators = (0..options.num_adjudicators).map(|i| {
        let name = if options.use_random_names {
            rand::random::<FullName>().to_string()
        }
        else {
            format!("Adjudicator {}", i)
        };
        Adjudicator {
            uuid: id(3000, i),
            tournament_id: Some(tournament.uuid),
            institution_id: Some(institutions[i as usize % institutions.len()]),
            name,
            base_score: (5.0 - 0.4 * i as f64).max(0.5),
            independent: false,
            adj_core: i == 0,
        }
    }).collect_vec();
    for adjudicator in adjudicators.iter() {
        adjudicator.save(db, true).await?;
        adjudicator.mark_available(db, first_round.uuid).await?;
    }

    if let (Some(adjudicator), Some(team)) = (adjudicators.first(), teams.first()) {
        schema::adjudicator_team_conflict::ActiveModel {
            uuid: ActiveValue::Set(Uuid::new_v4()),
            adjudicator_id: ActiveValue::Set(adjudicator.uuid),
            team_id: ActiveValue::Set(*team),
        }.insert(db).await?;
    }

    Ok(MockTournament {
        tournament,
        rounds: vec![first_round, second_round],
        debates,
        teams,
        institutions,
        regions,
        adjudicators,
    })
}
