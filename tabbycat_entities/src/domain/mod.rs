pub mod tournament;
pub mod round;
pub mod debate;
pub mod team;
pub mod adjudicator;
pub mod debate_adjudicator;
pub mod region;
pub mod break_category;
pub mod action_log;
