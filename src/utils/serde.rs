/*!
 * Serde utilities for the external wire formats.
 *
 * Touchstream elements exchange dates as OLE Automation dates: the number of
 * days (with a fractional time-of-day part) since 1899-12-30 00:00:00.
 * Negative values use a split representation where the integer part counts
 * days backwards but the fractional part still counts forwards.
 */

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const MILLIS_PER_DAY: i64 = 86_400_000;

fn oa_epoch() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Convert a UTC timestamp to an OLE Automation date, at millisecond precision
pub fn to_oa_date(value: DateTime<Utc>) -> f64 {
    let millis = (value - oa_epoch()).num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    let fraction = millis.rem_euclid(MILLIS_PER_DAY) as f64 / MILLIS_PER_DAY as f64;

    if days >= 0 {
        days as f64 + fraction
    } else {
        // Split representation: -1.25 is one day back, then six hours forward
        days as f64 - fraction
    }
}

/// Convert an OLE Automation date back to a UTC timestamp.
///
/// Returns `None` for non-finite input or values outside chrono's range.
pub fn from_oa_date(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }

    let whole_days = value.trunc();
    let fraction = (value - whole_days).abs();
    let millis = (whole_days * MILLIS_PER_DAY as f64) as i64
        + (fraction * MILLIS_PER_DAY as f64).round() as i64;

    oa_epoch().checked_add_signed(Duration::milliseconds(millis))
}

/// Serialize a timestamp as an OLE Automation date
pub fn serialize_oa_date<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(to_oa_date(*value))
}

/// Deserialize a timestamp from an OLE Automation date
pub fn deserialize_oa_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = f64::deserialize(deserializer)?;
    from_oa_date(value)
        .ok_or_else(|| D::Error::custom(format!("OLE Automation date out of range: {value}")))
}
