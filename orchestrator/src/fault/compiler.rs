//! Fault config compiler
//!
//! Resolves catalog names and ad-hoc rules into a `FaultConfig` and writes it
//! to `<output_dir>/fi.yaml`. Nothing is retained in memory after the write;
//! the caller owns the artifact's lifetime.

use std::path::{Path, PathBuf};

use super::artifact::{FaultConfig, DEFAULT_SEED, FAULT_CONFIG_FILE};
use super::catalog::FaultCatalog;
use crate::error::{OrchestratorError, OrchestratorResult};
use shared::{process_debug, process_info, FaultRule, ProcessId};

pub struct FaultConfigCompiler<'a> {
    catalog: &'a FaultCatalog,
    seed: String,
}

impl<'a> FaultConfigCompiler<'a> {
    /// Create a compiler over a catalog using the default seed
    pub fn new(catalog: &'a FaultCatalog) -> Self {
        Self {
            catalog,
            seed: DEFAULT_SEED.to_string(),
        }
    }

    /// Override the seed (fluent API)
    pub fn with_seed<S: Into<String>>(mut self, seed: S) -> Self {
        self.seed = seed.into();
        self
    }

    /// Build the configuration without writing it. Catalog rules come first,
    /// in the order requested, followed by the extra rule.
    pub fn resolve(
        &self,
        rule_names: Option<&[&str]>,
        extra_rule: Option<FaultRule>,
    ) -> OrchestratorResult<FaultConfig> {
        if rule_names.is_none() && extra_rule.is_none() {
            return Err(OrchestratorError::InvalidArguments {
                message: "at least one of rule names or an extra rule is required".to_string(),
            });
        }

        let mut rules = rule_names
            .unwrap_or_default()
            .iter()
            .map(|name| self.catalog.lookup(name))
            .collect::<OrchestratorResult<Vec<_>>>()?;
        rules.extend(extra_rule);

        Ok(FaultConfig::new(self.seed.clone(), rules))
    }

    /// Write the artifact and return its path
    pub fn compile(
        &self,
        output_dir: &Path,
        rule_names: Option<&[&str]>,
        extra_rule: Option<FaultRule>,
    ) -> OrchestratorResult<PathBuf> {
        let config = self.resolve(rule_names, extra_rule)?;
        let yaml = config.to_yaml()?;

        std::fs::create_dir_all(output_dir).map_err(|e| OrchestratorError::io(output_dir, e))?;

        let path = output_dir.join(FAULT_CONFIG_FILE);
        std::fs::write(&path, yaml).map_err(|e| OrchestratorError::io(&path, e))?;

        process_debug!(ProcessId::current(), "🧾 Fault rules: {:?}", config.rules);
        process_info!(
            ProcessId::current(),
            "💉 Wrote {} fault rule(s) to {}",
            config.rules.len(),
            path.display()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_keeps_request_order_then_extra() {
        let catalog = FaultCatalog::builtin();
        let extra = FaultRule::new(52, 100, 1, 50).unwrap();

        let config = FaultConfigCompiler::new(&catalog)
            .resolve(Some(&["bogus_2nd_fault", "obj_update_timeout"]), Some(extra))
            .unwrap();

        let ids: Vec<u32> = config.rules.iter().map(FaultRule::id).collect();
        assert_eq!(ids, [51, 50, 52]);
        assert_eq!(config.seed, DEFAULT_SEED);
    }

    #[test]
    fn test_resolve_allows_duplicates() {
        let catalog = FaultCatalog::builtin();
        let config = FaultConfigCompiler::new(&catalog)
            .resolve(Some(&["obj_update_timeout", "obj_update_timeout"]), None)
            .unwrap();
        assert_eq!(config.rules.len(), 2);
    }

    #[test]
    fn test_resolve_requires_a_source() {
        let catalog = FaultCatalog::builtin();
        let err = FaultConfigCompiler::new(&catalog).resolve(None, None).unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidArguments { .. }));
    }

    #[test]
    fn test_resolve_propagates_unknown_fault() {
        let catalog = FaultCatalog::builtin();
        let err = FaultConfigCompiler::new(&catalog)
            .resolve(Some(&["obj_update_timeout", "nope"]), None)
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::UnknownFault { ref name } if name == "nope"));
    }

    #[test]
    fn test_custom_seed() {
        let catalog = FaultCatalog::builtin();
        let config = FaultConfigCompiler::new(&catalog)
            .with_seed("987")
            .resolve(Some(&[]), None)
            .unwrap();
        assert_eq!(config.seed, "987");
        assert!(config.rules.is_empty());
    }
}
