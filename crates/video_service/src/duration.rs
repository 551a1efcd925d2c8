//! ISO 8601 duration (`PT1H2M3S`) to `HH:MM:SS` conversion.

use domain::DURATION_UNAVAILABLE;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// Date designators in the order they must appear, with fixed lengths for
/// the calendar units.
const DATE_UNITS: &[(char, u64)] = &[
    ('Y', 365 * SECONDS_PER_DAY),
    ('M', 30 * SECONDS_PER_DAY),
    ('D', SECONDS_PER_DAY),
];

const TIME_UNITS: &[(char, u64)] = &[
    ('H', SECONDS_PER_HOUR),
    ('M', SECONDS_PER_MINUTE),
    ('S', 1),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("duration is empty")]
    Empty,
    #[error("negative durations are not supported")]
    Negative,
    #[error("duration must start with 'P'")]
    MissingPrefix,
    #[error("duration has no components")]
    NoComponents,
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("designator {0:?} is repeated or out of order")]
    MisplacedDesignator(char),
    #[error("number is not followed by a designator")]
    DanglingNumber,
    #[error("only seconds may have a fractional part")]
    Fraction,
    #[error("duration is too large")]
    Overflow,
}

/// Renders `iso_duration` as `HH:MM:SS`, or `"N/A"` when it cannot be parsed.
///
/// Hours are not wrapped, so a video longer than a day renders as e.g.
/// `26:00:00`.
pub fn format(iso_duration: &str) -> String {
    match parse_seconds(iso_duration) {
        Ok(total) => format!(
            "{:02}:{:02}:{:02}",
            total / SECONDS_PER_HOUR,
            total % SECONDS_PER_HOUR / SECONDS_PER_MINUTE,
            total % SECONDS_PER_MINUTE
        ),
        Err(err) => {
            tracing::warn!(input = iso_duration, error = %err, "could not parse video duration");
            DURATION_UNAVAILABLE.to_string()
        }
    }
}

/// Parses an ISO 8601 duration into whole elapsed seconds.
///
/// Fractional seconds are truncated.
pub fn parse_seconds(iso_duration: &str) -> Result<u64, DurationError> {
    let input = iso_duration.trim();
    if input.is_empty() {
        return Err(DurationError::Empty);
    }
    if input.starts_with('-') {
        return Err(DurationError::Negative);
    }
    let body = input
        .strip_prefix('P')
        .ok_or(DurationError::MissingPrefix)?;

    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (body, None),
    };

    let mut total = 0u64;
    let mut components = accumulate(date_part, DATE_UNITS, &mut total)?;
    if let Some(time_part) = time_part {
        // `PT` and `P1DT` are invalid
        let time_components = accumulate(time_part, TIME_UNITS, &mut total)?;
        if time_components == 0 {
            return Err(DurationError::NoComponents);
        }
        components += time_components;
    }

    if components == 0 {
        return Err(DurationError::NoComponents);
    }
    Ok(total)
}

/// Adds every `<number><designator>` pair of `part` to `total`, returning how
/// many pairs were read.
fn accumulate(part: &str, units: &[(char, u64)], total: &mut u64) -> Result<usize, DurationError> {
    let mut rest = part;
    let mut next_unit = 0;
    let mut count = 0;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or(DurationError::DanglingNumber)?;
        let (number, tail) = rest.split_at(number_len);
        let designator = tail.chars().next().ok_or(DurationError::DanglingNumber)?;
        if number.is_empty() {
            return Err(DurationError::UnexpectedChar(designator));
        }

        let offset = units[next_unit..]
            .iter()
            .position(|(unit, _)| *unit == designator)
            .ok_or_else(|| {
                if units.iter().any(|(unit, _)| *unit == designator) {
                    DurationError::MisplacedDesignator(designator)
                } else {
                    DurationError::UnexpectedChar(designator)
                }
            })?;
        let (_, unit_seconds) = units[next_unit + offset];
        next_unit += offset + 1;

        let value = parse_number(number, unit_seconds == 1)?;
        *total = value
            .checked_mul(unit_seconds)
            .and_then(|seconds| total.checked_add(seconds))
            .ok_or(DurationError::Overflow)?;

        count += 1;
        rest = &tail[designator.len_utf8()..];
    }

    Ok(count)
}

fn parse_number(number: &str, allow_fraction: bool) -> Result<u64, DurationError> {
    let whole = match number.split_once('.') {
        Some((whole, fraction)) => {
            if !allow_fraction {
                return Err(DurationError::Fraction);
            }
            if whole.is_empty() || fraction.is_empty() {
                return Err(DurationError::UnexpectedChar('.'));
            }
            if !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err(DurationError::UnexpectedChar('.'));
            }
            whole
        }
        None => number,
    };

    // only digits remain, so a parse failure means the value does not fit
    whole.parse::<u64>().map_err(|_| DurationError::Overflow)
}
