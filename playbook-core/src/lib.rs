mod filter;
mod ids;
mod json;
pub mod record;
pub mod statistics;
mod teams;

pub use filter::{FilterError, GameLogFilter};
pub use ids::{PlayerId, format_player_id};
pub use json::{JsonRow, filter_null_values, into_rows};
pub use teams::{TEAM_CODES, TeamCode, is_valid_team_id};

pub const MIN_SEASON: i32 = 1920;

pub const MAX_WEEK: i32 = 22;
