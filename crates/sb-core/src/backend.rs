//! Contract with the declarative rule-matching backend.
//!
//! The backend holds the installed rule set and evaluates it against live
//! requests; this crate only produces rules for it. Updates use
//! remove-then-add semantics: one call removes previously installed ids
//! and adds a batch of new rules.

use std::collections::HashSet;

use crate::types::{NetworkRule, RuleId};

/// Error surfaced by a backend rule mutation.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("rule quota exceeded: {installed} installed, refused {requested} more")]
    QuotaExceeded { installed: usize, requested: usize },
    #[error("rule {rule_id} rejected: {reason}")]
    RuleRejected { rule_id: RuleId, reason: String },
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// A declarative rule-matching backend.
pub trait RuleBackend {
    /// Ids of the rules the backend currently holds.
    fn current_rule_ids(&self) -> Vec<RuleId>;

    /// Remove `remove_ids`, then add `add_rules`, as one mutation.
    ///
    /// A rejected mutation must leave no partial additions behind.
    fn replace_rules(
        &mut self,
        remove_ids: &[RuleId],
        add_rules: &[NetworkRule],
    ) -> Result<(), BackendError>;
}

/// In-memory reference backend.
///
/// Validates mutations the way a real engine would (quota, duplicate ids,
/// empty patterns) without doing any matching. Used by reconciler tests
/// and CLI dry runs.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    rules: Vec<NetworkRule>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that refuses to hold more than `quota` rules.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            rules: Vec::new(),
            quota: Some(quota),
        }
    }

    pub fn rules(&self) -> &[NetworkRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RuleBackend for MemoryBackend {
    fn current_rule_ids(&self) -> Vec<RuleId> {
        self.rules.iter().map(|rule| rule.id).collect()
    }

    fn replace_rules(
        &mut self,
        remove_ids: &[RuleId],
        add_rules: &[NetworkRule],
    ) -> Result<(), BackendError> {
        let remove: HashSet<RuleId> = remove_ids.iter().copied().collect();
        let retained = self
            .rules
            .iter()
            .filter(|rule| !remove.contains(&rule.id))
            .count();

        if let Some(quota) = self.quota {
            if retained + add_rules.len() > quota {
                return Err(BackendError::QuotaExceeded {
                    installed: retained,
                    requested: add_rules.len(),
                });
            }
        }

        // Validate the whole batch before mutating anything
        let mut incoming: HashSet<RuleId> = HashSet::with_capacity(add_rules.len());
        for rule in add_rules {
            if rule.url_filter.is_empty() {
                return Err(BackendError::RuleRejected {
                    rule_id: rule.id,
                    reason: "empty url filter".to_string(),
                });
            }
            let collides_installed = self
                .rules
                .iter()
                .any(|held| held.id == rule.id && !remove.contains(&held.id));
            if collides_installed || !incoming.insert(rule.id) {
                return Err(BackendError::RuleRejected {
                    rule_id: rule.id,
                    reason: "duplicate rule id".to_string(),
                });
            }
        }

        self.rules.retain(|rule| !remove.contains(&rule.id));
        self.rules.extend_from_slice(add_rules);
        Ok(())
    }
}
