//! Cluster status types
//!
//! A `ClusterHealthSnapshot` is the point-in-time answer to one system status
//! query: the state of every rank the administration interface reported.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One addressable server/engine instance within the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(pub u32);

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rank {}", self.0)
    }
}

/// State of a single rank as reported by the administration interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankState {
    Joined,
    Stopped,
    Excluded,
    Errored,
    Unknown,
}

impl RankState {
    /// Map a reported state string; anything unrecognised is `Unknown`
    pub fn from_reported(state: &str) -> Self {
        match state.trim().to_ascii_lowercase().as_str() {
            "joined" => RankState::Joined,
            "stopped" => RankState::Stopped,
            "excluded" => RankState::Excluded,
            "errored" => RankState::Errored,
            _ => RankState::Unknown,
        }
    }

    pub fn is_joined(&self) -> bool {
        matches!(self, RankState::Joined)
    }

    /// Ordering used when one rank is reported more than once; higher wins
    fn severity(&self) -> u8 {
        match self {
            RankState::Joined => 0,
            RankState::Unknown => 1,
            RankState::Stopped => 2,
            RankState::Excluded => 3,
            RankState::Errored => 4,
        }
    }
}

impl fmt::Display for RankState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RankState::Joined => "joined",
            RankState::Stopped => "stopped",
            RankState::Excluded => "excluded",
            RankState::Errored => "errored",
            RankState::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// Read-only result of one status query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterHealthSnapshot {
    ranks: BTreeMap<Rank, RankState>,
    taken_at: DateTime<Utc>,
}

impl ClusterHealthSnapshot {
    /// Capture a snapshot stamped with the current time. A rank reported
    /// more than once keeps its worst state.
    pub fn new(ranks: impl IntoIterator<Item = (Rank, RankState)>) -> Self {
        let mut merged = BTreeMap::new();
        for (rank, state) in ranks {
            merged
                .entry(rank)
                .and_modify(|current: &mut RankState| {
                    if state.severity() > current.severity() {
                        *current = state;
                    }
                })
                .or_insert(state);
        }

        Self {
            ranks: merged,
            taken_at: Utc::now(),
        }
    }

    pub fn ranks(&self) -> &BTreeMap<Rank, RankState> {
        &self.ranks
    }

    pub fn state_of(&self, rank: Rank) -> Option<RankState> {
        self.ranks.get(&rank).copied()
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}
