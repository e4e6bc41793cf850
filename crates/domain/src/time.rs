//! Timestamp type shared by reading bounds and baseline ranges.

use chrono::{DateTime, Utc};

/// UTC timestamp used for reading bounds and baseline ranges.
pub type Timestamp = DateTime<Utc>;
