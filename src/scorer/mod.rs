pub mod fantasy;
pub mod schema;

pub use fantasy::calculate_fantasy_score;
pub use schema::normalize_keys;
