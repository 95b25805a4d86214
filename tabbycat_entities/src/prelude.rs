pub use crate::domain::tournament::Tournament;
pub use crate::domain::round::{TournamentRound, DrawStatus};
pub use crate::domain::debate::Debate;
pub use crate::domain::adjudicator::{Adjudicator, AdjudicatorPosition};
pub use crate::domain::debate_adjudicator::{DebateAdjudicator, PanelMember};
pub use crate::domain::action_log::{ActionLogEntry, ActionLogType};
pub use crate::preferences::{Preference, Preferences};
