pub mod prelude;

pub mod action_log_entry;
pub mod adjudicator;
pub mod adjudicator_institution_conflict;
pub mod adjudicator_team_conflict;
pub mod blob_attachment;
pub mod break_category;
pub mod debate;
pub mod debate_adjudicator;
pub mod debate_team;
pub mod institution;
pub mod region;
pub mod round;
pub mod round_availability;
pub mod team;
pub mod tournament;
pub mod tournament_preference;
pub mod uploaded_image;
pub mod user;
pub mod user_access_key;
