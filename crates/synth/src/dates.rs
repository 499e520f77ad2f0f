//! Date windows for `date`, `date-time`, and `time` fields.
//!
//! Generated dates are offsets from a fixed start date, never from the
//! wall clock.

use rand::Rng;
use time::macros::{date, format_description};
use time::{Date, Duration, UtcOffset};

use crate::error::SchemaError;
use crate::rng::SeedRng;

/// Start date used when neither the context nor the scenario sets one.
pub const DEFAULT_BASE_DATE: Date = date!(2024 - 01 - 01);

/// Span, in days, of a window opened from a bare base date.
pub const DEFAULT_SPAN_DAYS: u32 = 365;

/// Inclusive range of dates that date-shaped fields are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Date,
    pub days: u32,
    /// Offset rendered on `date-time` values.
    pub offset: UtcOffset,
}

impl Default for DateWindow {
    fn default() -> Self {
        DateWindow::starting(DEFAULT_BASE_DATE)
    }
}

impl DateWindow {
    pub fn starting(start: Date) -> Self {
        DateWindow {
            start,
            days: DEFAULT_SPAN_DAYS,
            offset: UtcOffset::UTC,
        }
    }

    /// Window covering `start..=end`.
    pub fn between(start: Date, end: Date) -> Result<Self, SchemaError> {
        let span = (end - start).whole_days();
        if span < 0 {
            return Err(SchemaError::InvalidInput {
                field: "dateRange",
                value: format!("{}..{}", format_date(start), format_date(end)),
                message: "end precedes start".to_string(),
            });
        }
        Ok(DateWindow {
            start,
            days: u32::try_from(span).unwrap_or(u32::MAX),
            offset: UtcOffset::UTC,
        })
    }

    pub fn with_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self
    }

    pub(crate) fn date(&self, rng: &mut SeedRng) -> Date {
        let offset = rng.gen_range(0..=self.days);
        self.start
            .checked_add(Duration::days(i64::from(offset)))
            .unwrap_or(self.start)
    }

    pub(crate) fn date_string(&self, rng: &mut SeedRng) -> String {
        format_date(self.date(rng))
    }

    pub(crate) fn date_time_string(&self, rng: &mut SeedRng) -> String {
        let day = format_date(self.date(rng));
        let clock = time_string(rng);
        format!("{}T{}{}", day, clock, format_offset(self.offset))
    }
}

pub(crate) fn time_string(rng: &mut SeedRng) -> String {
    let secs: u32 = rng.gen_range(0..86_400);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Parse a `YYYY-MM-DD` date. `field` names the input in the error.
pub fn parse_date(value: &str, field: &'static str) -> Result<Date, SchemaError> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|e| {
        SchemaError::InvalidInput {
            field,
            value: value.to_string(),
            message: e.to_string(),
        }
    })
}

/// Interpret a time zone as a fixed offset. Accepts `UTC`, `Z`, and
/// `±HH:MM`; named zones are not resolved.
pub fn parse_time_zone(tz: &str) -> Option<UtcOffset> {
    let tz = tz.trim();
    if tz.eq_ignore_ascii_case("utc") || tz == "Z" {
        return Some(UtcOffset::UTC);
    }
    let (sign, rest) = match tz.as_bytes().first()? {
        b'+' => (1i8, &tz[1..]),
        b'-' => (-1i8, &tz[1..]),
        _ => return None,
    };
    let (h, m) = rest.split_once(':')?;
    let hours: i8 = h.parse().ok()?;
    let minutes: i8 = m.parse().ok()?;
    UtcOffset::from_hms(sign * hours, sign * minutes, 0).ok()
}

fn format_date(d: Date) -> String {
    format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day())
}

fn format_offset(offset: UtcOffset) -> String {
    if offset.is_utc() {
        return "Z".to_string();
    }
    let (h, m, _) = offset.as_hms();
    let sign = if offset.is_negative() { '-' } else { '+' };
    format!("{}{:02}:{:02}", sign, h.unsigned_abs(), m.unsigned_abs())
}
