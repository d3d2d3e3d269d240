//! Cluster status via the administration tool
//!
//! Runs `dmg -j system query -v` and turns its JSON reply into a
//! `ClusterHealthSnapshot`.

use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;

use crate::config::DmgConfig;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::ClusterStatusSource;
use shared::{process_debug, ClusterHealthSnapshot, ProcessId, Rank, RankState};

/// Top-level JSON reply of the administration tool
#[derive(Debug, Deserialize)]
struct DmgReply {
    #[serde(default)]
    response: Option<SystemQueryResponse>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    status: i32,
}

#[derive(Debug, Deserialize)]
struct SystemQueryResponse {
    #[serde(default)]
    members: Vec<Member>,
}

#[derive(Debug, Deserialize)]
struct Member {
    rank: u32,
    state: String,
}

/// Parse a system query reply into a snapshot
pub fn parse_system_query(json: &str) -> OrchestratorResult<ClusterHealthSnapshot> {
    let reply: DmgReply = serde_json::from_str(json)?;

    if let Some(error) = reply.error {
        return Err(OrchestratorError::StatusQuery { message: error });
    }
    if reply.status != 0 {
        return Err(OrchestratorError::StatusQuery {
            message: format!("system query returned status {}", reply.status),
        });
    }

    let members = reply.response.map(|r| r.members).unwrap_or_default();
    Ok(ClusterHealthSnapshot::new(
        members
            .into_iter()
            .map(|m| (Rank(m.rank), RankState::from_reported(&m.state))),
    ))
}

/// Status source backed by the `dmg` command
pub struct DmgStatusSource {
    config: DmgConfig,
}

impl DmgStatusSource {
    pub fn new(config: DmgConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ClusterStatusSource for DmgStatusSource {
    async fn query(&self) -> OrchestratorResult<ClusterHealthSnapshot> {
        let args = self.config.system_query_args();
        process_debug!(ProcessId::current(), "🔍 Running {} {}", self.config.binary, args.join(" "));

        let mut cmd = Command::new(&self.config.binary);
        cmd.args(&args).stdin(Stdio::null()).kill_on_drop(true);

        let output = tokio::time::timeout(self.config.query_timeout, cmd.output())
            .await
            .map_err(|_| OrchestratorError::StatusQuery {
                message: format!(
                    "{} gave no answer within {:?}",
                    self.config.binary, self.config.query_timeout
                ),
            })?
            .map_err(|source| OrchestratorError::Launch {
                program: self.config.binary.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        // The tool reports failures inside its JSON even on a non-zero exit
        match parse_system_query(&stdout) {
            Ok(snapshot) => {
                process_debug!(ProcessId::current(), "Cluster reports {} rank(s)", snapshot.len());
                Ok(snapshot)
            }
            Err(e) if output.status.success() => Err(e),
            Err(OrchestratorError::JsonError(_)) => Err(OrchestratorError::StatusQuery {
                message: format!(
                    "{} exited with {}: {}",
                    self.config.binary,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_joined_members() {
        let json = r#"{
            "response": {"members": [
                {"addr": "10.0.0.1:10001", "state": "joined", "rank": 0, "uuid": "a"},
                {"addr": "10.0.0.2:10001", "state": "Joined", "rank": 1, "uuid": "b"}
            ]},
            "error": null,
            "status": 0
        }"#;

        let snapshot = parse_system_query(json).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.state_of(Rank(1)), Some(RankState::Joined));
    }

    #[test]
    fn test_parse_degraded_member() {
        let json = r#"{"response":{"members":[{"rank":0,"state":"joined"},{"rank":2,"state":"errored"},{"rank":3,"state":"adminexcluded"}]},"error":null,"status":0}"#;

        let snapshot = parse_system_query(json).unwrap();
        assert_eq!(snapshot.state_of(Rank(2)), Some(RankState::Errored));
        assert_eq!(snapshot.state_of(Rank(3)), Some(RankState::Unknown));
    }

    #[test]
    fn test_parse_reported_error() {
        let json = r#"{"response":null,"error":"unable to contact the DAOS Management Service","status":-1025}"#;
        assert_matches!(
            parse_system_query(json),
            Err(OrchestratorError::StatusQuery { ref message }) if message.contains("Management Service")
        );
    }

    #[test]
    fn test_parse_nonzero_status() {
        let json = r#"{"response":{"members":[]},"error":null,"status":-1}"#;
        assert_matches!(parse_system_query(json), Err(OrchestratorError::StatusQuery { .. }));
    }

    #[test]
    fn test_parse_empty_membership() {
        let snapshot = parse_system_query(r#"{"response":{"members":[]},"status":0}"#).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_parse_garbage() {
        assert_matches!(parse_system_query("not json"), Err(OrchestratorError::JsonError(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_query_missing_binary() {
        let source = DmgStatusSource::new(DmgConfig {
            binary: "/nonexistent/bin/dmg".to_string(),
            ..DmgConfig::default()
        });
        assert_matches!(source.query().await, Err(OrchestratorError::Launch { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_query_gives_up_on_silent_tool() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("dmg");
        std::fs::write(&tool, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let source = DmgStatusSource::new(DmgConfig {
            binary: tool.display().to_string(),
            query_timeout: std::time::Duration::from_millis(300),
            ..DmgConfig::default()
        });

        let started = std::time::Instant::now();
        assert_matches!(
            source.query().await,
            Err(OrchestratorError::StatusQuery { ref message }) if message.contains("no answer")
        );
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }
}
