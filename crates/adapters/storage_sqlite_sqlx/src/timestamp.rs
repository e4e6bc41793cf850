//! Timestamps are stored as fixed-width RFC 3339 text so that string
//! comparison in SQL matches chronological order.

use chrono::{DateTime, SecondsFormat};

use meterhub_domain::time::Timestamp;

pub(crate) fn encode(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn decode(value: &str) -> Result<Timestamp, sqlx::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}
