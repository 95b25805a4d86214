pub use super::action_log_entry::Entity as ActionLogEntry;
pub use super::adjudicator::Entity as Adjudicator;
pub use super::adjudicator_institution_conflict::Entity as AdjudicatorInstitutionConflict;
pub use super::adjudicator_team_conflict::Entity as AdjudicatorTeamConflict;
pub use super::blob_attachment::Entity as BlobAttachment;
pub use super::break_category::Entity as BreakCategory;
pub use super::debate::Entity as Debate;
pub use super::debate_adjudicator::Entity as DebateAdjudicator;
pub use super::debate_team::Entity as DebateTeam;
pub use super::institution::Entity as Institution;
pub use super::region::Entity as Region;
pub use super::round::Entity as Round;
pub use super::round_availability::Entity as RoundAvailability;
pub use super::team::Entity as Team;
pub use super::tournament::Entity as Tournament;
pub use super::tournament_preference::Entity as TournamentPreference;
pub use super::uploaded_image::Entity as UploadedImage;
pub use super::user::Entity as User;
pub use super::user_access_key::Entity as UserAccessKey;
