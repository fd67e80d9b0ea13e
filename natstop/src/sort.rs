//! Connection ordering keys and the ranking applied before display.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::types::ConnectionInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Cid,
    Subs,
    Pending,
    MsgsTo,
    MsgsFrom,
    BytesTo,
    BytesFrom,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid option to sort by: {0}")]
pub struct InvalidSortKey(pub String);

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Cid,
        SortKey::Subs,
        SortKey::Pending,
        SortKey::MsgsTo,
        SortKey::MsgsFrom,
        SortKey::BytesTo,
        SortKey::BytesFrom,
    ];

    /// Name used on the command line, in the sort prompt and as the `/connz` `s=` hint.
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Cid => "cid",
            SortKey::Subs => "subs",
            SortKey::Pending => "pending",
            SortKey::MsgsTo => "msgs_to",
            SortKey::MsgsFrom => "msgs_from",
            SortKey::BytesTo => "bytes_to",
            SortKey::BytesFrom => "bytes_from",
        }
    }

    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = InvalidSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| InvalidSortKey(s.to_string()))
    }
}

/// Returns the connections ordered by `key`. `cid` ascends, every other key descends.
/// Equal keys keep their input order.
pub fn rank(conns: &[ConnectionInfo], key: SortKey) -> Vec<ConnectionInfo> {
    let mut out = conns.to_vec();
    // sort_by_key is stable
    match key {
        SortKey::Cid => out.sort_by_key(|c| c.id),
        SortKey::Subs => out.sort_by_key(|c| Reverse(c.subscription_count)),
        SortKey::Pending => out.sort_by_key(|c| Reverse(c.pending_bytes)),
        SortKey::MsgsTo => out.sort_by_key(|c| Reverse(c.out_msgs)),
        SortKey::MsgsFrom => out.sort_by_key(|c| Reverse(c.in_msgs)),
        SortKey::BytesTo => out.sort_by_key(|c| Reverse(c.out_bytes)),
        SortKey::BytesFrom => out.sort_by_key(|c| Reverse(c.in_bytes)),
    }
    out
}
