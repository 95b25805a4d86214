use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tournament::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tournament::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tournament::Slug).string_len(50).not_null().unique_key())
                    .col(ColumnDef::new(Tournament::Name).string().not_null())
                    .col(ColumnDef::new(Tournament::Seq).integer().not_null().default(0))
                    .col(ColumnDef::new(Tournament::Active).boolean().not_null().default(true))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TournamentPreference::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TournamentPreference::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TournamentPreference::TournamentId).uuid().not_null())
                    .col(ColumnDef::new(TournamentPreference::Key).string_len(100).not_null())
                    .col(ColumnDef::new(TournamentPreference::Value).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(TournamentPreference::Table, TournamentPreference::TournamentId)
                            .to(Tournament::Table, Tournament::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("tournament_preference_key")
                    .table(TournamentPreference::Table)
                    .col(TournamentPreference::TournamentId)
                    .col(TournamentPreference::Key)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(User::Username).string_len(150).not_null().unique_key())
                    .col(ColumnDef::new(User::PasswordHash).string().not_null())
                    .col(ColumnDef::new(User::IsSuperuser).boolean().not_null().default(false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserAccessKey::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserAccessKey::KeyHash).string().not_null().primary_key())
                    .col(ColumnDef::new(UserAccessKey::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserAccessKey::TournamentId).uuid())
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserAccessKey::Table, UserAccessKey::UserId)
                            .to(User::Table, User::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserAccessKey::Table, UserAccessKey::TournamentId)
                            .to(Tournament::Table, Tournament::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Region::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Region::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Region::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Region::Seq).integer().not_null().default(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Institution::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Institution::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Institution::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Institution::Code).string_len(20).not_null())
                    .col(ColumnDef::new(Institution::RegionId).uuid())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Institution::Table, Institution::RegionId)
                            .to(Region::Table, Region::Uuid)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BreakCategory::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BreakCategory::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(BreakCategory::TournamentId).uuid().not_null())
                    .col(ColumnDef::new(BreakCategory::Name).string_len(50).not_null())
                    .col(ColumnDef::new(BreakCategory::Slug).string_len(50).not_null())
                    .col(ColumnDef::new(BreakCategory::Seq).integer().not_null())
                    .col(ColumnDef::new(BreakCategory::IsGeneral).boolean().not_null().default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .from(BreakCategory::Table, BreakCategory::TournamentId)
                            .to(Tournament::Table, Tournament::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Round::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Round::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Round::TournamentId).uuid().not_null())
                    .col(ColumnDef::new(Round::Seq).integer().not_null())
                    .col(ColumnDef::new(Round::Name).string_len(40).not_null())
                    .col(ColumnDef::new(Round::Abbreviation).string_len(10).not_null())
                    .col(ColumnDef::new(Round::DrawStatus).string_len(1).not_null().default("N"))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Round::Table, Round::TournamentId)
                            .to(Tournament::Table, Tournament::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("round_tournament_seq")
                    .table(Round::Table)
                    .col(Round::TournamentId)
                    .col(Round::Seq)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Team::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Team::TournamentId).uuid().not_null())
                    .col(ColumnDef::new(Team::InstitutionId).uuid())
                    .col(ColumnDef::new(Team::Name).string_len(100).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Team::Table, Team::TournamentId)
                            .to(Tournament::Table, Tournament::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Team::Table, Team::InstitutionId)
                            .to(Institution::Table, Institution::Uuid)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Debate::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Debate::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Debate::RoundId).uuid().not_null())
                    .col(ColumnDef::new(Debate::RoomRank).integer().not_null().default(0))
                    .col(ColumnDef::new(Debate::Bracket).double().not_null().default(0.0))
                    .col(ColumnDef::new(Debate::Importance).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Debate::Table, Debate::RoundId)
                            .to(Round::Table, Round::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DebateTeam::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DebateTeam::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DebateTeam::DebateId).uuid().not_null())
                    .col(ColumnDef::new(DebateTeam::TeamId).uuid().not_null())
                    .col(ColumnDef::new(DebateTeam::Side).string_len(3).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(DebateTeam::Table, DebateTeam::DebateId)
                            .to(Debate::Table, Debate::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DebateTeam::Table, DebateTeam::TeamId)
                            .to(Team::Table, Team::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Adjudicator::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Adjudicator::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Adjudicator::TournamentId).uuid())
                    .col(ColumnDef::new(Adjudicator::InstitutionId).uuid())
                    .col(ColumnDef::new(Adjudicator::Name).string_len(40).not_null())
                    .col(ColumnDef::new(Adjudicator::BaseScore).double().not_null().default(0.0))
                    .col(ColumnDef::new(Adjudicator::Independent).boolean().not_null().default(false))
                    .col(ColumnDef::new(Adjudicator::AdjCore).boolean().not_null().default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Adjudicator::Table, Adjudicator::TournamentId)
                            .to(Tournament::Table, Tournament::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Adjudicator::Table, Adjudicator::InstitutionId)
                            .to(Institution::Table, Institution::Uuid)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RoundAvailability::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RoundAvailability::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(RoundAvailability::RoundId).uuid().not_null())
                    .col(ColumnDef::new(RoundAvailability::AdjudicatorId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(RoundAvailability::Table, RoundAvailability::RoundId)
                            .to(Round::Table, Round::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RoundAvailability::Table, RoundAvailability::AdjudicatorId)
                            .to(Adjudicator::Table, Adjudicator::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("round_availability_round_adjudicator")
                    .table(RoundAvailability::Table)
                    .col(RoundAvailability::RoundId)
                    .col(RoundAvailability::AdjudicatorId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdjudicatorTeamConflict::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AdjudicatorTeamConflict::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AdjudicatorTeamConflict::AdjudicatorId).uuid().not_null())
                    .col(ColumnDef::new(AdjudicatorTeamConflict::TeamId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(AdjudicatorTeamConflict::Table, AdjudicatorTeamConflict::AdjudicatorId)
                            .to(Adjudicator::Table, Adjudicator::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AdjudicatorTeamConflict::Table, AdjudicatorTeamConflict::TeamId)
                            .to(Team::Table, Team::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdjudicatorInstitutionConflict::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AdjudicatorInstitutionConflict::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AdjudicatorInstitutionConflict::AdjudicatorId).uuid().not_null())
                    .col(ColumnDef::new(AdjudicatorInstitutionConflict::InstitutionId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(AdjudicatorInstitutionConflict::Table, AdjudicatorInstitutionConflict::AdjudicatorId)
                            .to(Adjudicator::Table, Adjudicator::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AdjudicatorInstitutionConflict::Table, AdjudicatorInstitutionConflict::InstitutionId)
                            .to(Institution::Table, Institution::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DebateAdjudicator::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DebateAdjudicator::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DebateAdjudicator::DebateId).uuid().not_null())
                    .col(ColumnDef::new(DebateAdjudicator::AdjudicatorId).uuid().not_null())
                    .col(ColumnDef::new(DebateAdjudicator::Type).string_len(2).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(DebateAdjudicator::Table, DebateAdjudicator::DebateId)
                            .to(Debate::Table, Debate::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DebateAdjudicator::Table, DebateAdjudicator::AdjudicatorId)
                            .to(Adjudicator::Table, Adjudicator::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("debate_adjudicator_debate_adjudicator")
                    .table(DebateAdjudicator::Table)
                    .col(DebateAdjudicator::DebateId)
                    .col(DebateAdjudicator::AdjudicatorId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ActionLogEntry::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ActionLogEntry::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(ActionLogEntry::Type).string_len(40).not_null())
                    .col(ColumnDef::new(ActionLogEntry::UserId).uuid())
                    .col(ColumnDef::new(ActionLogEntry::TournamentId).uuid().not_null())
                    .col(ColumnDef::new(ActionLogEntry::RoundId).uuid())
                    .col(ColumnDef::new(ActionLogEntry::Content).text())
                    .col(ColumnDef::new(ActionLogEntry::Timestamp).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(ActionLogEntry::Table, ActionLogEntry::UserId)
                            .to(User::Table, User::Uuid)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ActionLogEntry::Table, ActionLogEntry::TournamentId)
                            .to(Tournament::Table, Tournament::Uuid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ActionLogEntry::Table, ActionLogEntry::RoundId)
                            .to(Round::Table, Round::Uuid)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("action_log_entry_tournament_timestamp")
                    .table(ActionLogEntry::Table)
                    .col(ActionLogEntry::TournamentId)
                    .col(ActionLogEntry::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ActionLogEntry::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(DebateAdjudicator::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(AdjudicatorInstitutionConflict::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(AdjudicatorTeamConflict::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(RoundAvailability::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Adjudicator::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(DebateTeam::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Debate::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Team::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Round::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(BreakCategory::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Institution::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Region::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(UserAccessKey::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(TournamentPreference::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Tournament::Table).to_owned()).await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Tournament {
    Table,
    Uuid,
    Slug,
    Name,
    Seq,
    Active,
}

#[derive(DeriveIden)]
enum TournamentPreference {
    Table,
    Uuid,
    TournamentId,
    Key,
    Value,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Uuid,
    Username,
    PasswordHash,
    IsSuperuser,
}

#[derive(DeriveIden)]
enum UserAccessKey {
    Table,
    KeyHash,
    UserId,
    TournamentId,
}

#[derive(DeriveIden)]
enum Region {
    Table,
    Uuid,
    Name,
    Seq,
}

#[derive(DeriveIden)]
enum Institution {
    Table,
    Uuid,
    Name,
    Code,
    RegionId,
}

#[derive(DeriveIden)]
enum BreakCategory {
    Table,
    Uuid,
    TournamentId,
    Name,
    Slug,
    Seq,
    IsGeneral,
}

#[derive(DeriveIden)]
enum Round {
    Table,
    Uuid,
    TournamentId,
    Seq,
    Name,
    Abbreviation,
    DrawStatus,
}

#[derive(DeriveIden)]
enum Team {
    Table,
    Uuid,
    TournamentId,
    InstitutionId,
    Name,
}

#[derive(DeriveIden)]
enum Debate {
    Table,
    Uuid,
    RoundId,
    RoomRank,
    Bracket,
    Importance,
}

#[derive(DeriveIden)]
enum DebateTeam {
    Table,
    Uuid,
    DebateId,
    TeamId,
    Side,
}

#[derive(DeriveIden)]
enum Adjudicator {
    Table,
    Uuid,
    TournamentId,
    InstitutionId,
    Name,
    BaseScore,
    Independent,
    AdjCore,
}

#[derive(DeriveIden)]
enum RoundAvailability {
    Table,
    Uuid,
    RoundId,
    AdjudicatorId,
}

#[derive(DeriveIden)]
enum AdjudicatorTeamConflict {
    Table,
    Uuid,
    AdjudicatorId,
    TeamId,
}

#[derive(DeriveIden)]
enum AdjudicatorInstitutionConflict {
    Table,
    Uuid,
    AdjudicatorId,
    InstitutionId,
}

#[derive(DeriveIden)]
enum DebateAdjudicator {
    Table,
    Uuid,
    DebateId,
    AdjudicatorId,
    Type,
}

#[derive(DeriveIden)]
enum ActionLogEntry {
    Table,
    Uuid,
    Type,
    UserId,
    TournamentId,
    RoundId,
    Content,
    Timestamp,
}
