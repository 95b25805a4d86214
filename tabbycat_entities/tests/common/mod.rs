use migration::MigratorTrait;
use tabbycat_entities::mock::{self, MockTournament};
use sea_orm::{prelude::*, Database, Statement};

pub async fn set_up_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = Database::connect("sqlite::memory:").await?;
    migration::Migrator::up(&db, None).await?;
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "PRAGMA foreign_keys = ON;",
        vec![])
    ).await?;
    Ok(db)
}

pub async fn set_up_mock_db() -> Result<(DatabaseConnection, MockTournament), anyhow::Error> {
    let db = set_up_db().await?;
    let mock = mock::make_mock_tournament(&db).await?;
    Ok((db, mock))
}
