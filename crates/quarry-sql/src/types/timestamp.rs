//! Timestamp serializer.

use chrono::NaiveDateTime;
use quarry_common::types::TIMESTAMP_FORMAT;
use quarry_common::{QuarryError, QuarryResult, Value};

use super::TypeSerializer;

/// Parse format accepting the fractional seconds the engine appends to
/// result cells (`2020-05-04 11:19:03.000`).
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Serializer for `timestamp` columns.
///
/// Values are written at second precision without a time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampSerializer;

impl TimestampSerializer {
    fn timestamp(self, value: &Value) -> QuarryResult<NaiveDateTime> {
        value
            .as_timestamp()
            .ok_or_else(|| QuarryError::value_coercion(value, self.type_name()))
    }
}

impl TypeSerializer for TimestampSerializer {
    fn type_name(&self) -> &'static str {
        "timestamp"
    }

    fn literal(&self, value: &Value) -> QuarryResult<String> {
        Ok(format!("timestamp '{}'", self.dump(value)?))
    }

    fn dump(&self, value: &Value) -> QuarryResult<String> {
        Ok(self.timestamp(value)?.format(TIMESTAMP_FORMAT).to_string())
    }

    fn load(&self, text: &str) -> QuarryResult<Value> {
        NaiveDateTime::parse_from_str(text, TIMESTAMP_PARSE_FORMAT)
            .map(Value::Timestamp)
            .map_err(|_| QuarryError::coercion(text, self.type_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn truncate_to_seconds(timestamp: NaiveDateTime) -> NaiveDateTime {
        timestamp.with_nanosecond(0).unwrap()
    }

    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 5, 4)
            .unwrap()
            .and_hms_milli_opt(11, 19, 3, 250)
            .unwrap()
    }

    #[test]
    fn test_dump_drops_subseconds() {
        let s = TimestampSerializer;
        assert_eq!(
            s.dump(&Value::Timestamp(sample())).unwrap(),
            "2020-05-04 11:19:03"
        );
        assert_eq!(
            s.literal(&Value::Timestamp(sample())).unwrap(),
            "timestamp '2020-05-04 11:19:03'"
        );
    }

    #[test]
    fn test_round_trip_at_second_precision() {
        let s = TimestampSerializer;
        let dumped = s.dump(&Value::Timestamp(sample())).unwrap();
        assert_eq!(
            s.load(&dumped).unwrap(),
            Value::Timestamp(truncate_to_seconds(sample()))
        );
    }

    #[test]
    fn test_load_engine_output() {
        let s = TimestampSerializer;
        let loaded = s.load("2020-05-04 11:19:03.000").unwrap();
        assert_eq!(loaded, Value::Timestamp(truncate_to_seconds(sample())));
    }

    #[test]
    fn test_load_rejects_other_formats() {
        let s = TimestampSerializer;
        assert!(s.load("2020-05-04T11:19:03Z").is_err());
        assert!(s.load("yesterday").is_err());
        assert!(s.load(" 2020-05-04 11:19:03").is_err());
        assert!(s.dump(&Value::from("2020-05-04 11:19:03")).is_err());
    }
}
