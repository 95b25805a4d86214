use std::io::Read;

use anyhow::{anyhow, bail, Context};
use csv::{ReaderBuilder, StringRecord};
use sea_orm::{ConnectionTrait, TransactionTrait};

use tabbycat_entities::domain::region::Institution;
use tabbycat_entities::prelude::*;

use crate::{auth::create_user, state::AppState};

#[derive(clap::Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,
    CreateSuperuser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Import adjudicators from a csv with the columns name,institution_code,score,independent
    ImportAdjudicators {
        #[arg(long)]
        tournament: String,
        path: String,
    },
}

impl Command {
    pub async fn run(&self, app_state: AppState) -> anyhow::Result<()> {
        match self {
            Command::Serve => bail!("serve is handled by the binary"),
            Command::CreateSuperuser { username, password } => {
                let uuid = create_user(&app_state.db, username, password, true).await?;
                println!("Created superuser {} ({})", username, uuid);
            },
            Command::ImportAdjudicators { tournament, path } => {
                let tournament = Tournament::get_by_slug(&app_state.db, tournament).await?
                    .ok_or_else(|| anyhow!("Tournament {} does not exist", tournament))?;
                let file = std::fs::File::open(path).with_context(|| format!("Could not open {}", path))?;

                let txn = app_state.db.begin().await?;
                let imported = import_adjudicators(&txn, &tournament, file).await?;
                txn.commit().await?;
                println!("Imported {} adjudicators into {}", imported.len(), tournament.name);
            }
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "" | "0" | "false" | "no" | "n" => Ok(false),
        "1" | "true" | "yes" | "y" => Ok(true),
        other => Err(anyhow!("Invalid boolean {}", other)),
    }
}

fn parse_record(record: &StringRecord, line: usize) -> anyhow::Result<(String, Option<String>, f64, bool)> {
    let name = record.get(0).map(|s| s.trim()).filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("Line {}: missing name", line))?;
    let institution_code = record.get(1).map(|s| s.trim()).filter(|s| !s.is_empty());
    let score = record.get(2).map(|s| s.trim()).unwrap_or("")
        .parse::<f64>()
        .with_context(|| format!("Line {}: invalid score", line))?;
    if !score.is_finite() {
        return Err(anyhow!("Line {}: score must be a finite number", line));
    }
    let independent = parse_bool(record.get(3).unwrap_or(""))
        .with_context(|| format!("Line {}: invalid independent flag", line))?;
    Ok((name.to_string(), institution_code.map(|s| s.to_string()), score, independent))
}

/// Creates one adjudicator per csv row. Fails without partial results on the first bad row.
pub async fn import_adjudicators<C, R>(db: &C, tournament: &Tournament, reader: R) -> anyhow::Result<Vec<Adjudicator>> where C: ConnectionTrait, R: Read {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let mut adjudicators = vec![];
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let (name, institution_code, score, independent) = parse_record(&record, idx + 2)?;

        let mut adjudicator = Adjudicator::new(Some(tournament.uuid), name, score);
        adjudicator.independent = independent;
        if let Some(code) = institution_code {
            let institution = Institution::get_by_code(db, &code).await?
                .ok_or_else(|| anyhow!("Line {}: unknown institution {}", idx + 2, code))?;
            adjudicator.institution_id = Some(institution.uuid);
        }
        adjudicators.push(adjudicator);
    }

    for adjudicator in adjudicators.iter() {
        adjudicator.save(db, true).await?;
    }
    tracing::info!("Imported {} adjudicators into {}", adjudicators.len(), tournament.slug);
    Ok(adjudicators)
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_record_with_optional_columns() {
        let record = StringRecord::from(vec!["Ada", "", "3.5", ""]);
        let (name, code, score, independent) = parse_record(&record, 2).unwrap();
        assert_eq!(name, "Ada");
        assert_eq!(code, None);
        assert_eq!(score, 3.5);
        assert!(!independent);
    }

    #[test]
    fn test_parse_record_rejects_bad_score() {
        let record = StringRecord::from(vec!["Ada", "I0", "high", "yes"]);
        assert!(parse_record(&record, 2).is_err());
    }

    #[test]
    fn test_parse_record_rejects_non_finite_score() {
        for score in ["NaN", "inf", "-infinity"] {
            let record = StringRecord::from(vec!["Ada", "I0", score, "yes"]);
            assert!(parse_record(&record, 2).is_err(), "{} was accepted", score);
        }
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("Yes").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }
}
