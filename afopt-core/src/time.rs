/// MM:SS:CC time codec.
///
/// Every duration in this crate is an integer count of centiseconds
/// (1/100 s), which keeps comparisons and subtractions exact. Text
/// representations exist only at the boundary.
use thiserror::Error;

/// Malformed time text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("invalid time format {0:?}, expected MM:SS:CC")]
    FieldCount(String),
    #[error("non-numeric field {field:?} in time {input:?}")]
    NonNumeric { input: String, field: String },
}

/// Parse an `MM:SS:CC` time string to centiseconds.
///
/// Exactly three fields, delimited by `:` or `.` (leaderboard pages use the
/// former, [`format_time`] output the latter). Fields are plain integers —
/// no range validation beyond that.
pub fn parse_time(text: &str) -> Result<i64, TimeParseError> {
    let parts: Vec<&str> = text.trim().split([':', '.']).collect();
    if parts.len() != 3 {
        return Err(TimeParseError::FieldCount(text.to_string()));
    }

    let mut fields = [0_i64; 3];
    for (slot, part) in fields.iter_mut().zip(&parts) {
        *slot = part.parse().map_err(|_| TimeParseError::NonNumeric {
            input: text.to_string(),
            field: part.to_string(),
        })?;
    }

    Ok(fields[0] * 6000 + fields[1] * 100 + fields[2])
}

/// Format centiseconds as `MM:SS.CC` with two-digit zero-padded fields.
///
/// Exact inverse of [`parse_time`] for all non-negative inputs.
pub fn format_time(cs: i64) -> String {
    let minutes = cs / 6000;
    let remainder = cs % 6000;
    format!("{:02}:{:02}.{:02}", minutes, remainder / 100, remainder % 100)
}
