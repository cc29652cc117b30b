//! Rule-set reconciliation.
//!
//! Prepares a compiled rule sequence for the matching backend: duplicate
//! removal, whitelist exclusion, and batched remove-then-add application.
//! Every call works on its own dedup scope; nothing here is cached across
//! reconciliations.

use std::collections::HashSet;

use sb_core::backend::{BackendError, RuleBackend};
use sb_core::types::{NetworkRule, RuleAction, RuleId};

/// Max rules per backend mutation call.
pub const BATCH_SIZE: usize = 5_000;

pub struct ReconcileStats {
    pub before: usize,
    pub after: usize,
    pub deduped: usize,
}

/// Deduplicate and whitelist-annotate a compiled rule sequence in place.
///
/// Duplicates share `(url_filter, action)`; the first occurrence wins and
/// survivor order is unchanged. Afterwards every survivor carries the full
/// whitelist as its excluded initiator domains (a replace, not a merge -
/// there is no per-rule whitelist scoping).
pub fn reconcile_rules(rules: &mut Vec<NetworkRule>, whitelist: &[String]) -> ReconcileStats {
    let before = rules.len();

    let mut seen: HashSet<(String, RuleAction)> = HashSet::with_capacity(rules.len());
    rules.retain(|rule| seen.insert((rule.url_filter.clone(), rule.action)));

    let deduped = before - rules.len();
    if deduped > 0 {
        log::debug!("dropped {deduped} duplicate rules");
    }

    for rule in rules.iter_mut() {
        rule.excluded_initiator_domains = whitelist.to_vec();
    }

    ReconcileStats {
        before,
        after: rules.len(),
        deduped,
    }
}

/// Install a reconciled rule sequence into the backend in batches.
///
/// The backend's current rules are removed by the first batch; later
/// batches only add. Batches are applied strictly in order and the first
/// backend error is returned as-is, with no cleanup of batches already
/// applied - retry policy belongs to the caller. `batch_size` must be
/// non-zero.
pub fn install_rules<B: RuleBackend>(
    backend: &mut B,
    rules: &[NetworkRule],
    batch_size: usize,
) -> Result<(), BackendError> {
    let remove_ids = backend.current_rule_ids();

    if rules.is_empty() {
        if !remove_ids.is_empty() {
            backend.replace_rules(&remove_ids, &[])?;
        }
        return Ok(());
    }

    for (index, batch) in rules.chunks(batch_size).enumerate() {
        let removals: &[RuleId] = if index == 0 { &remove_ids } else { &[] };
        log::debug!(
            "applying rule batch {} ({} rules, {} removals)",
            index + 1,
            batch.len(),
            removals.len()
        );
        backend.replace_rules(removals, batch)?;
    }

    Ok(())
}
