use core::fmt::Write;
use core::time::Duration;

use serde_json::Value;

use crate::CodecError;
use crate::coerce::number::integer_from_number;
use crate::coerce::{AttrContext, Attribute};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Formats a duration the way Go's `time.Duration` prints.
///
/// # Examples
///
/// ```
/// use core::time::Duration;
/// use hd_codec::coerce::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(3600)), "1h0m0s");
/// assert_eq!(format_duration(Duration::from_millis(90_500)), "1m30.5s");
/// assert_eq!(format_duration(Duration::from_micros(1500)), "1.5ms");
/// assert_eq!(format_duration(Duration::ZERO), "0s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".into();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}µs", fixed(nanos, 3));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", fixed(nanos, 6));
    }

    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h{minutes}m");
    } else if minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    let rest = u128::from(seconds) * NANOS_PER_SEC + u128::from(duration.subsec_nanos());
    let _ = write!(out, "{}s", fixed(rest, 9));
    out
}

// `value / 10^digits` without trailing zeros.
fn fixed(value: u128, digits: u32) -> String {
    let scale = 10u128.pow(digits);
    let (int, frac) = (value / scale, value % scale);
    if frac == 0 {
        return int.to_string();
    }
    let frac = format!("{frac:0width$}", width = digits as usize);
    format!("{int}.{}", frac.trim_end_matches('0'))
}

/// Parses a Go duration string such as `"1h30m"`, `"1.5s"` or `"250ms"`.
///
/// Units are `ns`, `us` (`µs`), `ms`, `s`, `m` and `h`. A leading `+` is
/// accepted; negative durations are not representable and yield `None`.
///
/// # Examples
///
/// ```
/// use core::time::Duration;
/// use hd_codec::coerce::parse_duration;
///
/// assert_eq!(parse_duration("1h0m0s"), Some(Duration::from_secs(3600)));
/// assert_eq!(parse_duration("1.5s"), Some(Duration::from_millis(1500)));
/// assert_eq!(parse_duration("2m250ms"), Some(Duration::from_millis(120_250)));
/// assert_eq!(parse_duration("0"), Some(Duration::ZERO));
/// assert_eq!(parse_duration("-1s"), None);
/// assert_eq!(parse_duration("5 s"), None);
/// ```
pub fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.strip_prefix('+').unwrap_or(text);
    if text == "0" {
        return Some(Duration::ZERO);
    }
    if text.is_empty() {
        return None;
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut total: u128 = 0;
    let mut rest = text;

    while !rest.is_empty() {
        let split = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        let (number, tail) = rest.split_at(split);
        let split = tail.find(is_number).unwrap_or(tail.len());
        let (unit, next) = tail.split_at(split);

        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3600 * NANOS_PER_SEC,
            _ => return None,
        };

        let (int, frac) = number.split_once('.').unwrap_or((number, ""));
        if int.is_empty() && frac.is_empty() {
            return None;
        }
        let int: u128 = if int.is_empty() { 0 } else { int.parse().ok()? };
        total = total.checked_add(int.checked_mul(scale)?)?;

        if !frac.is_empty() {
            // Digits beyond nanosecond precision of the largest unit are dropped.
            let frac = &frac[..frac.len().min(18)];
            let value: u128 = frac.parse().ok()?;
            let denominator = 10u128.pow(frac.len() as u32);
            total = total.checked_add(value * scale / denominator)?;
        }

        rest = next;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// A Go duration string; integers are read as nanoseconds.
impl Attribute for Duration {
    #[inline]
    fn encode(&self, _: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        Ok(Some(Value::String(format_duration(*self))))
    }

    fn decode(value: Value, _: &AttrContext<'_>) -> Result<Self, CodecError> {
        match &value {
            Value::String(text) => parse_duration(text).ok_or_else(|| CodecError::InvalidValue {
                target: "Duration",
                reason: format!("`{text}` is not a duration"),
            }),
            Value::Number(number) => integer_from_number::<u64>(number).map(Duration::from_nanos),
            other => Err(CodecError::mismatch("duration", other)),
        }
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        self.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use serde_json::json;

    use super::{format_duration, parse_duration};
    use crate::CodecError;
    use crate::coerce::testing::{decode, encode};

    #[test]
    fn formats_like_go() {
        assert_eq!(format_duration(Duration::from_nanos(999)), "999ns");
        assert_eq!(format_duration(Duration::from_micros(250)), "250µs");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(2 * 3600 + 5)), "2h0m5s");
    }

    #[test]
    fn parses_compound_strings() {
        assert_eq!(parse_duration("1h30m"), Some(Duration::from_secs(5400)));
        assert_eq!(parse_duration(".5s"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("1.25h"), Some(Duration::from_secs(4500)));
        assert_eq!(parse_duration("3µs"), Some(Duration::from_micros(3)));
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("12"), None);
        assert_eq!(parse_duration("1d"), None);
        assert_eq!(parse_duration("."), None);
    }

    #[test]
    fn attribute_round_trip() {
        let timeout = Duration::from_millis(61_250);
        assert_eq!(encode(&timeout, "attr,timeout"), Some(json!("1m1.25s")));
        assert_eq!(decode::<Duration>(json!("1m1.25s"), "attr,timeout").unwrap(), timeout);
        assert_eq!(decode::<Duration>(json!(1_000_000), "attr,timeout").unwrap(), Duration::from_millis(1));
        assert!(matches!(
            decode::<Duration>(json!("soon"), "attr,timeout"),
            Err(CodecError::InvalidValue { target: "Duration", .. })
        ));
        assert!(matches!(
            decode::<Duration>(json!(-5), "attr,timeout"),
            Err(CodecError::UnknownNumberKind { .. })
        ));
    }
}
