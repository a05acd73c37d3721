use std::fmt;

const PLAYER_ID_DIGITS: usize = 9;

const PLAYER_ID_MAX_LEN: usize = 10;

/// Canonical player identifier in the `XX-XXXXXXX` shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Checks the raw value for the allowed shape and reformats it when needed.
    /// Only digits and hyphens are accepted, at most ten characters.
    pub fn parse(raw: &str) -> Option<PlayerId> {
        if raw.is_empty() || raw.len() > PLAYER_ID_MAX_LEN {
            return None;
        }
        if !raw.chars().all(|c| c.is_ascii_digit() || c == '-') {
            return None;
        }
        if is_canonical(raw) {
            return Some(PlayerId(raw.to_string()));
        }
        format_player_id(raw).map(PlayerId)
    }

    /// Accepts an already canonical id, as stored in the player table.
    pub fn from_canonical(raw: &str) -> Option<PlayerId> {
        is_canonical(raw).then(|| PlayerId(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pads the digits of `raw` to nine places and reinserts the hyphen.
pub fn format_player_id(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let padded = format!("{:0>width$}", digits, width = PLAYER_ID_DIGITS);
    let formatted = format!("{}-{}", &padded[..2], &padded[2..]);
    is_canonical(&formatted).then_some(formatted)
}

fn is_canonical(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == PLAYER_ID_MAX_LEN
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[2] == b'-'
        && bytes[3..].iter().all(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_player_id() {
        assert_eq!(format_player_id("00-0019596").as_deref(), Some("00-0019596"));
        assert_eq!(format_player_id("19596").as_deref(), Some("00-0019596"));
        assert_eq!(format_player_id("000019596").as_deref(), Some("00-0019596"));
        assert_eq!(format_player_id("ab12").as_deref(), Some("00-0000012"));
        assert_eq!(format_player_id("1234567890"), None);
        assert_eq!(format_player_id(""), None);
        assert_eq!(format_player_id("--"), None);
    }

    #[test]
    fn test_parse_player_id() {
        assert_eq!(
            PlayerId::parse("00-0019596").map(|id| id.to_string()),
            Some("00-0019596".to_string())
        );
        assert_eq!(
            PlayerId::parse("0019596").map(|id| id.to_string()),
            Some("00-0019596".to_string())
        );
        assert_eq!(
            PlayerId::parse("1-2345678").map(|id| id.to_string()),
            Some("01-2345678".to_string())
        );
        assert!(PlayerId::parse("").is_none());
        assert!(PlayerId::parse("00-00195960").is_none());
        assert!(PlayerId::parse("00_0019596").is_none());
        assert!(PlayerId::parse("abc").is_none());
        assert!(PlayerId::parse("1234567890").is_none());
    }

    #[test]
    fn test_parsed_ids_are_canonical() {
        for raw in ["1", "12", "123456789", "-1-2-3-", "99-9999999", "000000001"] {
            let id = PlayerId::parse(raw).expect("should parse");
            assert!(is_canonical(id.as_str()), "{} -> {}", raw, id);
        }
    }

    #[test]
    fn test_from_canonical() {
        assert!(PlayerId::from_canonical("00-0019596").is_some());
        assert!(PlayerId::from_canonical("19596").is_none());
        assert!(PlayerId::from_canonical("00-0019596\"; --").is_none());
    }
}
