pub mod players;
pub mod roster;
pub mod schedule;

pub use players::PlayerStatsIndex;
pub use roster::RosterIndex;
pub use schedule::ScheduleIndex;
