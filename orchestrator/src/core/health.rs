//! Cluster health verification
//!
//! Reduces a status snapshot to a single verdict: healthy only when every
//! rank reports `joined`. One degraded rank fails the whole cluster.

use serde::{Deserialize, Serialize};
use shared::{ClusterHealthSnapshot, Rank, RankState};

/// Reduced form of a snapshot, kept in scenario reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthVerdict {
    pub healthy: bool,
    pub rank_count: usize,
    pub degraded: Vec<(Rank, RankState)>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HealthVerifier;

impl HealthVerifier {
    pub fn new() -> Self {
        Self
    }

    /// True iff no rank is in a state other than `joined`. An empty snapshot
    /// passes vacuously; callers that need ranks must check for that.
    pub fn check(&self, snapshot: &ClusterHealthSnapshot) -> bool {
        snapshot.ranks().values().all(RankState::is_joined)
    }

    /// Full verdict listing each degraded rank in rank order
    pub fn verdict(&self, snapshot: &ClusterHealthSnapshot) -> HealthVerdict {
        let degraded: Vec<(Rank, RankState)> = snapshot
            .ranks()
            .iter()
            .filter(|(_, state)| !state.is_joined())
            .map(|(rank, state)| (*rank, *state))
            .collect();

        HealthVerdict {
            healthy: degraded.is_empty(),
            rank_count: snapshot.len(),
            degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(states: &[RankState]) -> ClusterHealthSnapshot {
        ClusterHealthSnapshot::new(
            states
                .iter()
                .enumerate()
                .map(|(i, state)| (Rank(i as u32), *state)),
        )
    }

    #[test]
    fn test_all_joined_is_healthy() {
        let verifier = HealthVerifier::new();
        assert!(verifier.check(&snapshot(&[RankState::Joined; 4])));
    }

    #[test]
    fn test_empty_snapshot_is_vacuously_healthy() {
        let verifier = HealthVerifier::new();
        let empty = snapshot(&[]);

        assert!(verifier.check(&empty));
        assert_eq!(verifier.verdict(&empty).rank_count, 0);
    }

    #[test]
    fn test_any_non_joined_rank_fails() {
        let verifier = HealthVerifier::new();
        for bad in [
            RankState::Stopped,
            RankState::Excluded,
            RankState::Errored,
            RankState::Unknown,
        ] {
            let snap = snapshot(&[RankState::Joined, bad, RankState::Joined]);
            assert!(!verifier.check(&snap), "{bad} should fail the cluster");
        }
    }

    #[test]
    fn test_verdict_lists_degraded_ranks_in_order() {
        let verifier = HealthVerifier::new();
        let snap = snapshot(&[
            RankState::Errored,
            RankState::Joined,
            RankState::Excluded,
        ]);

        let verdict = verifier.verdict(&snap);
        assert!(!verdict.healthy);
        assert_eq!(verdict.rank_count, 3);
        assert_eq!(
            verdict.degraded,
            vec![(Rank(0), RankState::Errored), (Rank(2), RankState::Excluded)]
        );
        assert_eq!(verdict.healthy, verifier.check(&snap));
    }
}
