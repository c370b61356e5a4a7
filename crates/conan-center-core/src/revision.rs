//! Revision indexes
//!
//! Artifactory keeps an `index.json` next to every revisioned node:
//!
//! ```json
//! {
//!   "reference": "b2/4.0.0@_/_",
//!   "revisions": [
//!     { "revision": "3c07b6a54477e856d429493d01c85636", "time": "2020-09-16T14:05:05.965+0000" }
//!   ]
//! }
//! ```
//!
//! Revisions are listed in arrival order, which is not necessarily time
//! order. The latest revision is the one with the greatest timestamp.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Format written by Artifactory (always UTC, literal `+0000`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f+0000";

/// Parsing counterpart of [`TIMESTAMP_FORMAT`], lenient on the fraction digits
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f+0000";

/// Parse an Artifactory revision timestamp
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_PARSE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| CoreError::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// Format a timestamp the way Artifactory does
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

mod rt_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(time))
    }

    /// `null` means unknown and sorts before any real timestamp
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(DateTime::<Utc>::MIN_UTC),
            Some(value) => super::parse_timestamp(&value).map_err(serde::de::Error::custom),
        }
    }
}

/// One entry of a revision index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRecord {
    pub revision: String,
    #[serde(with = "rt_timestamp")]
    pub time: DateTime<Utc>,
}

/// Content of an `index.json` document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionIndex {
    #[serde(default)]
    pub revisions: Vec<RevisionRecord>,
}

impl RevisionIndex {
    /// Parse an `index.json` document
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Sort revisions by time, oldest first. Ties keep their listed order.
    pub fn sort_by_time(&mut self) {
        self.revisions.sort_by_key(|r| r.time);
    }

    /// Revisions sorted oldest first
    pub fn into_sorted(mut self) -> Vec<RevisionRecord> {
        self.sort_by_time();
        self.revisions
    }

    /// Revision with the greatest timestamp
    pub fn latest(&self) -> Option<&RevisionRecord> {
        self.revisions.iter().max_by_key(|r| r.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = r#"{
        "reference": "b2/4.0.0@_/_",
        "revisions": [{
            "revision": "3c07b6a54477e856d429493d01c85636",
            "time": "2020-09-16T14:05:05.965+0000"
        }, {
            "revision": "5918010f58ef4294511ff176ccc236b0",
            "time": "2020-08-17T15:20:47.871+0000"
        }]
    }"#;

    fn record(revision: &str, time: &str) -> RevisionRecord {
        RevisionRecord {
            revision: revision.to_string(),
            time: parse_timestamp(time).unwrap(),
        }
    }

    #[test]
    fn test_parse_json() {
        let index = RevisionIndex::from_slice(CONTENT.as_bytes()).unwrap();
        assert_eq!(index.revisions.len(), 2);
        assert_eq!(index.revisions[0].revision, "3c07b6a54477e856d429493d01c85636");
        assert_eq!(index.revisions[1].revision, "5918010f58ef4294511ff176ccc236b0");
    }

    #[test]
    fn test_order_by_time() {
        let index = RevisionIndex::from_slice(CONTENT.as_bytes()).unwrap();
        let sorted = index.into_sorted();
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].revision, "5918010f58ef4294511ff176ccc236b0");
        assert_eq!(sorted[1].revision, "3c07b6a54477e856d429493d01c85636");
    }

    #[test]
    fn test_latest_independent_of_input_order() {
        let r1 = record("r1", "2020-01-01T00:00:00.001+0000");
        let r2 = record("r2", "2020-01-01T00:00:00.002+0000");
        let r3 = record("r3", "2021-06-30T23:59:59.999+0000");

        let permutations = [
            [&r1, &r2, &r3],
            [&r1, &r3, &r2],
            [&r2, &r1, &r3],
            [&r2, &r3, &r1],
            [&r3, &r1, &r2],
            [&r3, &r2, &r1],
        ];
        for permutation in permutations {
            let index = RevisionIndex {
                revisions: permutation.iter().map(|r| (*r).clone()).collect(),
            };
            assert_eq!(index.latest().unwrap().revision, "r3");

            let sorted = index.into_sorted();
            let names: Vec<&str> = sorted.iter().map(|r| r.revision.as_str()).collect();
            assert_eq!(names, ["r1", "r2", "r3"]);
            assert!(sorted.windows(2).all(|w| w[0].time < w[1].time));
        }
    }

    #[test]
    fn test_timestamp_format() {
        let time = parse_timestamp("2020-09-16T14:05:05.965+0000").unwrap();
        assert_eq!(time.timestamp_millis(), 1_600_265_105_965);
        assert_eq!(format_timestamp(&time), "2020-09-16T14:05:05.965+0000");
    }

    #[test]
    fn test_timestamp_rejects_other_formats() {
        assert!(parse_timestamp("2020-09-16T14:05:05.965Z").is_err());
        assert!(parse_timestamp("2020-09-16T14:05:05.965+02:00").is_err());
        assert!(parse_timestamp("2020-09-16 14:05:05").is_err());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_bad_timestamp_in_document() {
        let content = r#"{"revisions": [{"revision": "abc", "time": "2020-09-16"}]}"#;
        let err = RevisionIndex::from_slice(content.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("2020-09-16"));
    }

    #[test]
    fn test_malformed_document() {
        assert!(RevisionIndex::from_slice(b"not json").is_err());
        assert!(RevisionIndex::from_slice(br#"{"revisions": [{"time": "x"}]}"#).is_err());
    }

    #[test]
    fn test_null_time_sorts_first() {
        let content = r#"{"revisions": [
            {"revision": "known", "time": "2020-01-01T00:00:00.000+0000"},
            {"revision": "unknown", "time": null}
        ]}"#;
        let index = RevisionIndex::from_slice(content.as_bytes()).unwrap();
        assert_eq!(index.latest().unwrap().revision, "known");
        assert_eq!(index.into_sorted()[0].revision, "unknown");
    }

    #[test]
    fn test_empty_document() {
        let index = RevisionIndex::from_slice(b"{}").unwrap();
        assert!(index.latest().is_none());
    }

    #[test]
    fn test_serialize_round_trip_format() {
        let index = RevisionIndex {
            revisions: vec![record("abc", "2020-11-08T01:08:43.496+0000")],
        };
        let json = serde_json::to_string(&index).unwrap();
        assert_eq!(
            json,
            r#"{"revisions":[{"revision":"abc","time":"2020-11-08T01:08:43.496+0000"}]}"#
        );
    }
}
