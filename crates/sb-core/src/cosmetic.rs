//! Cosmetic (CSS hiding) rule storage.
//!
//! The store is rebuilt from scratch on every compile and queried by the
//! page-side injector through [`CssRuleStore::applicable_selectors`].
//! Exception rules never apply directly; they only subtract matching
//! selectors at lookup time.

use std::collections::HashMap;

use serde::Serialize;

/// Sentinel domain for cosmetic rules without a domain prefix.
pub const GLOBAL_DOMAIN: &str = "global";

/// One cosmetic hiding directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CssRule {
    /// Target domain, or [`GLOBAL_DOMAIN`] when unscoped.
    pub domain: String,
    /// Trimmed, non-empty CSS selector.
    pub selector: String,
    pub is_exception: bool,
}

/// Cosmetic rules organized for per-domain lookup.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CssRuleStore {
    global: Vec<String>,
    domains: HashMap<String, Vec<String>>,
    exceptions: HashMap<String, Vec<String>>,
}

impl CssRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one parsed cosmetic rule into the store.
    pub fn insert(&mut self, rule: CssRule) {
        if rule.is_exception {
            self.exceptions.entry(rule.domain).or_default().push(rule.selector);
        } else if rule.domain == GLOBAL_DOMAIN {
            self.global.push(rule.selector);
        } else {
            self.domains.entry(rule.domain).or_default().push(rule.selector);
        }
    }

    /// Selectors the injector should hide on `domain`: global selectors
    /// plus the domain's own, minus any selector containing an exception
    /// selector registered for that domain.
    ///
    /// The subtraction is literal substring containment, not CSS selector
    /// equivalence. Kept for compatibility with the lists this consumes.
    pub fn applicable_selectors(&self, domain: &str) -> Vec<String> {
        let mut selectors = self.global.clone();
        if let Some(scoped) = self.domains.get(domain) {
            selectors.extend(scoped.iter().cloned());
        }

        if let Some(exceptions) = self.exceptions.get(domain) {
            selectors.retain(|selector| {
                !exceptions.iter().any(|exception| selector.contains(exception.as_str()))
            });
        }

        selectors
    }

    pub fn global_selectors(&self) -> &[String] {
        &self.global
    }

    pub fn domain_selectors(&self, domain: &str) -> Option<&[String]> {
        self.domains.get(domain).map(Vec::as_slice)
    }

    pub fn exception_selectors(&self, domain: &str) -> Option<&[String]> {
        self.exceptions.get(domain).map(Vec::as_slice)
    }

    /// Total stored selectors across all three maps.
    pub fn len(&self) -> usize {
        self.global.len()
            + self.domains.values().map(Vec::len).sum::<usize>()
            + self.exceptions.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
