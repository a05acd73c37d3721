use serde_json::Value;
use thiserror::Error;

const BYE: &str = "BYE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Win,
    Loss,
    Tie,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameResultError {
    #[error("failed to parse game_result: {0}")]
    Unparsable(String),
    #[error("unexpected type for game_result: {0}")]
    UnexpectedType(String),
}

/// Reads a stored `game_result` value, either a JSON object or a string holding one.
/// Returns `Ok(None)` for bye weeks and for results without numeric scores.
pub fn parse_outcome(result: &Value) -> Result<Option<GameOutcome>, GameResultError> {
    let parsed;
    let object = match result {
        Value::String(s) if s == BYE => return Ok(None),
        Value::String(s) => {
            if s.trim() == "[object Object]" {
                return Err(GameResultError::Unparsable(s.clone()));
            }
            parsed = serde_json::from_str::<Value>(s)
                .map_err(|_| GameResultError::Unparsable(s.clone()))?;
            &parsed
        }
        Value::Object(_) => result,
        other => return Err(GameResultError::UnexpectedType(other.to_string())),
    };

    let team_score = object.get("team_score").and_then(Value::as_f64);
    let opponent_score = object.get("opponent_score").and_then(Value::as_f64);
    let (Some(team_score), Some(opponent_score)) = (team_score, opponent_score) else {
        return Ok(None);
    };
    Ok(Some(if team_score > opponent_score {
        GameOutcome::Win
    } else if team_score < opponent_score {
        GameOutcome::Loss
    } else {
        GameOutcome::Tie
    }))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TeamRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    #[serde(rename = "gamesCounted")]
    pub games_counted: u32,
}

impl TeamRecord {
    pub fn record(&mut self, outcome: GameOutcome) {
        self.games_counted += 1;
        match outcome {
            GameOutcome::Win => self.wins += 1,
            GameOutcome::Loss => self.losses += 1,
            GameOutcome::Tie => self.ties += 1,
        }
    }
}
