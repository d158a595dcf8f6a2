//! Snapshot file naming: `cloudflare_backup_<YYYYMMDD_HHMMSS>.json` (UTC).

use chrono::{DateTime, NaiveDateTime, Utc};

const PREFIX: &str = "cloudflare_backup_";
const SUFFIX: &str = ".json";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// File name for a snapshot taken at `at`.
#[must_use]
pub fn file_name(at: DateTime<Utc>) -> String {
    format!("{PREFIX}{}{SUFFIX}", at.format(STAMP_FORMAT))
}

/// Timestamp encoded in a snapshot file name, `None` for foreign files.
#[must_use]
pub fn parse(name: &str) -> Option<DateTime<Utc>> {
    let stamp = name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    if stamp.len() != 15 {
        return None;
    }
    NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Keep snapshot file names only, most recent first.
#[must_use]
pub fn sort_newest_first(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut dated: Vec<(DateTime<Utc>, String)> = names
        .into_iter()
        .filter_map(|name| parse(&name).map(|at| (at, name)))
        .collect();
    dated.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
    dated.dedup_by(|a, b| a.1 == b.1);
    dated.into_iter().map(|(_, name)| name).collect()
}
