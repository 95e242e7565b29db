use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use hd_directive::TimeFormat;
use serde_json::Value;

use crate::CodecError;
use crate::coerce::{AttrContext, Attribute};

const DEFAULT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
const ISO8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

fn invalid(target: &'static str, reason: impl ToString) -> CodecError {
    CodecError::InvalidValue {
        target,
        reason: reason.to_string(),
    }
}

fn expect_str<'v>(value: &'v Value, expected: &'static str) -> Result<&'v str, CodecError> {
    value
        .as_str()
        .ok_or_else(|| CodecError::mismatch(expected, value))
}

fn from_timestamp(value: &Value, target: &'static str) -> Result<DateTime<Utc>, CodecError> {
    let seconds = value
        .as_i64()
        .ok_or_else(|| CodecError::mismatch("integer timestamp", value))?;
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| invalid(target, "timestamp out of range"))
}

// -----------------------------------------------------------------------------
// DateTime<Utc>

/// The zero time, [`DateTime::default`], is never written. That is the Unix
/// epoch `1970-01-01T00:00:00Z`; a field holding exactly that instant reads
/// back as unset. Use `Option<DateTime<Utc>>` with a later instant, or a
/// `timestamp` integer field, when the epoch itself is meaningful.
impl Attribute for DateTime<Utc> {
    fn encode(&self, cx: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        if *self == DateTime::<Utc>::default() {
            return Ok(None);
        }
        let value = match cx.directive.time_format() {
            TimeFormat::Default => Value::String(self.format(DEFAULT_FORMAT).to_string()),
            TimeFormat::Iso8601 => Value::String(self.format(ISO8601_FORMAT).to_string()),
            TimeFormat::Rfc3339 => Value::String(self.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            TimeFormat::Timestamp => Value::from(self.timestamp()),
            TimeFormat::DateOnly => Value::String(self.format(DATE_FORMAT).to_string()),
            TimeFormat::TimeOnly => Value::String(self.format(TIME_FORMAT).to_string()),
        };
        Ok(Some(value))
    }

    fn decode(value: Value, cx: &AttrContext<'_>) -> Result<Self, CodecError> {
        const TARGET: &str = "DateTime<Utc>";

        match cx.directive.time_format() {
            TimeFormat::Timestamp => from_timestamp(&value, TARGET),
            TimeFormat::DateOnly => {
                let date = NaiveDate::decode(value, cx)?;
                Ok(date.and_time(NaiveTime::MIN).and_utc())
            }
            TimeFormat::TimeOnly => {
                let time = NaiveTime::decode(value, cx)?;
                Ok(DateTime::<Utc>::default().date_naive().and_time(time).and_utc())
            }
            TimeFormat::Default | TimeFormat::Iso8601 | TimeFormat::Rfc3339 => {
                let text = expect_str(&value, "time string")?;
                DateTime::parse_from_rfc3339(text)
                    .map(|time| time.with_timezone(&Utc))
                    .map_err(|err| invalid(TARGET, format_args!("`{text}`: {err}")))
            }
        }
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        *self == DateTime::<Utc>::default()
    }
}

// -----------------------------------------------------------------------------
// NaiveDate

/// Always written as `%Y-%m-%d`, or as the Unix seconds of midnight under
/// `timestamp`. Accepts full RFC 3339 times on decode.
///
/// [`NaiveDate::default`] is `1970-01-01` and, like the zero [`DateTime`], is
/// never written.
impl Attribute for NaiveDate {
    fn encode(&self, cx: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        if *self == NaiveDate::default() {
            return Ok(None);
        }
        Ok(Some(match cx.directive.time_format() {
            TimeFormat::Timestamp => Value::from(self.and_time(NaiveTime::MIN).and_utc().timestamp()),
            _ => Value::String(self.format(DATE_FORMAT).to_string()),
        }))
    }

    fn decode(value: Value, cx: &AttrContext<'_>) -> Result<Self, CodecError> {
        const TARGET: &str = "NaiveDate";

        if cx.directive.time_format() == TimeFormat::Timestamp {
            return from_timestamp(&value, TARGET).map(|time| time.date_naive());
        }
        let text = expect_str(&value, "date string")?;
        NaiveDate::parse_from_str(text, DATE_FORMAT)
            .or_else(|_| DateTime::parse_from_rfc3339(text).map(|time| time.date_naive()))
            .map_err(|err| invalid(TARGET, format_args!("`{text}`: {err}")))
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        *self == NaiveDate::default()
    }
}

// -----------------------------------------------------------------------------
// NaiveTime

/// Written as `%H:%M:%S`. Midnight is a real time of day and is kept.
impl Attribute for NaiveTime {
    #[inline]
    fn encode(&self, _: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        Ok(Some(Value::String(self.format(TIME_FORMAT).to_string())))
    }

    fn decode(value: Value, _: &AttrContext<'_>) -> Result<Self, CodecError> {
        let text = expect_str(&value, "time string")?;
        NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
            .map_err(|err| invalid("NaiveTime", format_args!("`{text}`: {err}")))
    }

    #[inline]
    fn is_zero_value(&self) -> bool {
        *self == NaiveTime::MIN
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
    use serde_json::json;

    use crate::CodecError;
    use crate::coerce::testing::{decode, encode};

    fn born() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1815, 12, 10, 8, 30, 15).unwrap()
    }

    #[test]
    fn formats() {
        let at = born();
        assert_eq!(encode(&at, "attr,at"), Some(json!("1815-12-10T08:30:15.000Z")));
        assert_eq!(encode(&at, "attr,at,iso8601"), Some(json!("1815-12-10T08:30:15Z")));
        assert_eq!(encode(&at, "attr,at,rfc3339"), Some(json!("1815-12-10T08:30:15Z")));
        assert_eq!(encode(&at, "attr,at,timestamp"), Some(json!(at.timestamp())));
        assert_eq!(encode(&at, "attr,at,date_only"), Some(json!("1815-12-10")));
        assert_eq!(encode(&at, "attr,at,time_only"), Some(json!("08:30:15")));
    }

    #[test]
    fn zero_time_is_omitted() {
        assert_eq!(encode(&DateTime::<Utc>::default(), "attr,at"), None);
        assert_eq!(encode(&Some(DateTime::<Utc>::default()), "attr,at"), None);
        assert_eq!(encode(&NaiveDate::default(), "attr,on"), None);
        assert_eq!(encode(&NaiveTime::MIN, "attr,at"), Some(json!("00:00:00")));

        // The zero value is the epoch itself; its neighbours are written.
        let epoch = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(encode(&epoch, "attr,at,timestamp"), None);
        assert_eq!(
            encode(&Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 1).unwrap(), "attr,at,timestamp"),
            Some(json!(1))
        );
        assert_eq!(encode(&NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(), "attr,on"), None);
        assert_eq!(
            encode(&NaiveDate::from_ymd_opt(1970, 1, 2).unwrap(), "attr,on"),
            Some(json!("1970-01-02"))
        );
    }

    #[test]
    fn decodes_every_format() {
        let at = born();
        assert_eq!(decode::<DateTime<Utc>>(json!("1815-12-10T08:30:15.000Z"), "attr,at").unwrap(), at);
        assert_eq!(
            decode::<DateTime<Utc>>(json!("1815-12-10T09:30:15+01:00"), "attr,at,iso8601").unwrap(),
            at
        );
        assert_eq!(
            decode::<DateTime<Utc>>(json!(at.timestamp()), "attr,at,timestamp").unwrap(),
            at
        );
        assert_eq!(
            decode::<DateTime<Utc>>(json!("1815-12-10"), "attr,at,date").unwrap(),
            Utc.with_ymd_and_hms(1815, 12, 10, 0, 0, 0).unwrap()
        );
        assert_eq!(
            decode::<DateTime<Utc>>(json!("08:30:15"), "attr,at,time").unwrap(),
            Utc.with_ymd_and_hms(1970, 1, 1, 8, 30, 15).unwrap()
        );
        assert_eq!(
            decode::<NaiveDate>(json!("2024-02-29T10:00:00Z"), "attr,on").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            decode::<DateTime<Utc>>(json!("yesterday"), "attr,at"),
            Err(CodecError::InvalidValue { .. })
        ));
        assert!(matches!(
            decode::<DateTime<Utc>>(json!("2020-01-01T00:00:00Z"), "attr,at,timestamp"),
            Err(CodecError::Mismatch { .. })
        ));
        assert!(matches!(
            decode::<Option<DateTime<Utc>>>(json!(12), "attr,at"),
            Err(CodecError::UnsupportedPointerTarget { .. })
        ));
    }
}
