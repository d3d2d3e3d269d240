//! Test fixtures and data for orchestrator tests

#![allow(dead_code)]

use std::time::Duration;

use orchestrator::{CrashConfig, PoolTarget};
use shared::{ClusterHealthSnapshot, FaultRule, Rank, RankState};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const POOL: &'static str = "crash_pool";
    pub const CONTAINER: &'static str = "crash_cont";
    pub const RANK_COUNT: u32 = 4;

    pub fn target() -> PoolTarget {
        PoolTarget::new(Self::POOL, Self::CONTAINER)
    }

    /// Production timing; the tests run on a virtual clock
    pub fn crash_config() -> CrashConfig {
        CrashConfig::default()
    }

    /// Every rank joined
    pub fn healthy_snapshot() -> ClusterHealthSnapshot {
        ClusterHealthSnapshot::new((0..Self::RANK_COUNT).map(|r| (Rank(r), RankState::Joined)))
    }

    /// One rank in the given state, the rest joined
    pub fn degraded_snapshot(rank: u32, state: RankState) -> ClusterHealthSnapshot {
        ClusterHealthSnapshot::new((0..Self::RANK_COUNT).map(|r| {
            if r == rank {
                (Rank(r), state)
            } else {
                (Rank(r), RankState::Joined)
            }
        }))
    }

    pub fn empty_snapshot() -> ClusterHealthSnapshot {
        ClusterHealthSnapshot::new(std::iter::empty())
    }

    /// The catalog's object-update timeout fault
    pub fn obj_update_timeout() -> FaultRule {
        FaultRule::new(50, 100, 1, 17).unwrap()
    }

    pub const WRITE_DELAY: Duration = Duration::from_secs(50);
    pub const READ_DELAY: Duration = Duration::from_secs(105);
    pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
}
