//! Whole-document compilation.
//!
//! Drives the line parser over a filter-list document, accumulating
//! network rules (with sequential id allocation) and cosmetic rules, and
//! enforcing the hard rule-count ceiling.

use sb_core::cosmetic::CssRuleStore;
use sb_core::types::{NetworkRule, RuleId};

use crate::parser::{parse_line, LineOutcome};

/// Hard ceiling on network rules emitted per compile.
pub const MAX_RULES: usize = 30_000;

/// Shortest input accepted as a plausible filter list, in bytes.
pub const MIN_LIST_BYTES: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Input missing or below the minimum length sanity threshold.
    #[error("filter list empty or corrupt ({len} bytes)")]
    EmptyOrCorruptFilterList { len: usize },
}

/// Per-compile counters for reporting and logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    /// Lines examined (stops at the rule ceiling).
    pub lines: usize,
    pub network_rules: usize,
    pub css_rules: usize,
    pub skipped: usize,
    pub unparseable: usize,
    /// True when the rule ceiling cut the document short.
    pub truncated: bool,
}

/// Output of one compilation pass. Superseded wholesale by the next one.
#[derive(Debug, Clone)]
pub struct CompiledRuleSet {
    pub network_rules: Vec<NetworkRule>,
    pub css_store: CssRuleStore,
    pub stats: CompileStats,
}

/// Compile a filter-list document into a rule set.
///
/// Ids are allocated from 1 and only advance when a network rule is
/// emitted. Malformed lines are counted and dropped, never fatal. Once
/// `max_rules` network rules exist, remaining lines are not parsed and
/// the (truncated) result is still returned as a success.
pub fn compile_filter_list(
    text: &str,
    max_rules: usize,
) -> Result<CompiledRuleSet, CompileError> {
    if text.len() < MIN_LIST_BYTES {
        return Err(CompileError::EmptyOrCorruptFilterList { len: text.len() });
    }

    let mut network_rules: Vec<NetworkRule> = Vec::new();
    let mut css_store = CssRuleStore::new();
    let mut stats = CompileStats::default();
    let mut next_id: RuleId = 1;

    for raw in text.lines() {
        if network_rules.len() >= max_rules {
            log::warn!("rule ceiling of {max_rules} reached, skipping remaining lines");
            stats.truncated = true;
            break;
        }

        stats.lines += 1;

        match parse_line(raw, next_id) {
            LineOutcome::Network(rule) => {
                next_id += 1;
                stats.network_rules += 1;
                network_rules.push(rule);
            }
            LineOutcome::Cosmetic(rule) => {
                stats.css_rules += 1;
                css_store.insert(rule);
            }
            LineOutcome::Skip => stats.skipped += 1,
            LineOutcome::Unparseable => {
                log::debug!("unparseable filter line: {raw}");
                stats.unparseable += 1;
            }
        }
    }

    Ok(CompiledRuleSet {
        network_rules,
        css_store,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_core::cosmetic::GLOBAL_DOMAIN;
    use sb_core::types::{ResourceTypes, RuleAction, PRIORITY_BLOCK, PRIORITY_EXCEPTION};

    // Pads a document past the corruption threshold without adding rules.
    fn padded(body: &str) -> String {
        format!("{body}\n! {}\n", "-".repeat(120))
    }

    #[test]
    fn test_rejects_short_input() {
        let err = compile_filter_list("", MAX_RULES).unwrap_err();
        assert!(matches!(err, CompileError::EmptyOrCorruptFilterList { len: 0 }));
    }

    #[test]
    fn test_length_threshold_boundary() {
        let at_99 = format!("!{}", "x".repeat(98));
        assert_eq!(at_99.len(), 99);
        assert!(compile_filter_list(&at_99, MAX_RULES).is_err());

        let at_100 = format!("!{}", "x".repeat(99));
        assert_eq!(at_100.len(), 100);
        let compiled = compile_filter_list(&at_100, MAX_RULES).unwrap();
        assert!(compiled.network_rules.is_empty());
        assert_eq!(compiled.stats.skipped, 1);
    }

    #[test]
    fn test_single_anchor_round_trip() {
        let compiled = compile_filter_list(&padded("||example.com^"), MAX_RULES).unwrap();

        assert_eq!(compiled.network_rules.len(), 1);
        let rule = &compiled.network_rules[0];
        assert_eq!(rule.id, 1);
        assert_eq!(rule.url_filter, "||example.com");
        assert_eq!(rule.action, RuleAction::Block);
        assert_eq!(rule.priority, PRIORITY_BLOCK);
        assert_eq!(rule.resource_types, ResourceTypes::ALL);
    }

    #[test]
    fn test_mixed_document_routing() {
        let body = "! comment\n\
                    ||ads.example.com^\n\
                    ##.banner\n\
                    example.org##.sponsor\n\
                    @@good.example.org##.sponsor";
        let compiled = compile_filter_list(&padded(body), MAX_RULES).unwrap();

        assert_eq!(compiled.network_rules.len(), 1);
        assert_eq!(compiled.network_rules[0].url_filter, "||ads.example.com");
        assert_eq!(compiled.network_rules[0].priority, PRIORITY_BLOCK);

        let css = &compiled.css_store;
        assert_eq!(css.global_selectors(), [".banner".to_string()]);
        assert_eq!(
            css.domain_selectors("example.org"),
            Some([".sponsor".to_string()].as_slice())
        );
        assert_eq!(
            css.exception_selectors("good.example.org"),
            Some([".sponsor".to_string()].as_slice())
        );
        assert!(css.domain_selectors(GLOBAL_DOMAIN).is_none());
    }

    #[test]
    fn test_css_rules_do_not_consume_ids() {
        let body = "||first.example^\n\
                    example.org##.ad\n\
                    ##.banner\n\
                    ||second.example^";
        let compiled = compile_filter_list(&padded(body), MAX_RULES).unwrap();

        let ids: Vec<_> = compiled.network_rules.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_unparseable_lines_are_counted_not_fatal() {
        let body = "||ok.example^\n\
                    ????\n\
                    ||also-ok.example^";
        let compiled = compile_filter_list(&padded(body), MAX_RULES).unwrap();

        assert_eq!(compiled.network_rules.len(), 2);
        assert_eq!(compiled.stats.unparseable, 1);
    }

    #[test]
    fn test_exception_priority_independent_of_order() {
        let body = "||trusted.com^\n\
                    @@||trusted.com^";
        let compiled = compile_filter_list(&padded(body), MAX_RULES).unwrap();

        assert_eq!(compiled.network_rules.len(), 2);
        assert_eq!(compiled.network_rules[0].action, RuleAction::Block);
        assert_eq!(compiled.network_rules[1].action, RuleAction::Allow);
        assert_eq!(compiled.network_rules[1].priority, PRIORITY_EXCEPTION);
    }

    #[test]
    fn test_rule_ceiling_truncates() {
        let mut body = String::new();
        for i in 0..8 {
            body.push_str(&format!("||domain{i}.example^\n"));
        }
        let compiled = compile_filter_list(&padded(&body), 5).unwrap();

        assert_eq!(compiled.network_rules.len(), 5);
        assert!(compiled.stats.truncated);
        assert_eq!(compiled.network_rules.last().unwrap().id, 5);
    }

    #[test]
    fn test_ceiling_reached_on_final_line_is_not_truncation() {
        let mut body = String::new();
        for i in 0..6 {
            body.push_str(&format!("||domain{i}.example^\n"));
        }
        assert!(body.len() >= MIN_LIST_BYTES);

        let compiled = compile_filter_list(&body, 6).unwrap();
        assert_eq!(compiled.network_rules.len(), 6);
        assert!(!compiled.stats.truncated);
    }

    #[test]
    fn test_large_document_truncates_at_default_ceiling() {
        let mut body = String::with_capacity(1 << 20);
        for i in 0..31_000 {
            body.push_str(&format!("||domain{i}.com^\n"));
        }

        let compiled = compile_filter_list(&body, MAX_RULES).unwrap();
        assert_eq!(compiled.network_rules.len(), MAX_RULES);
        assert!(compiled.stats.truncated);
        assert_eq!(compiled.network_rules.last().unwrap().id, MAX_RULES as u32);
    }

    #[test]
    fn test_compile_is_idempotent() {
        let body = "||ads.example.com^\n\
                    banner$script,third-party\n\
                    /ads/pixel.gif";
        let text = padded(body);

        let first = compile_filter_list(&text, MAX_RULES).unwrap();
        let second = compile_filter_list(&text, MAX_RULES).unwrap();

        assert_eq!(first.network_rules, second.network_rules);
        assert_eq!(first.stats, second.stats);
    }
}
