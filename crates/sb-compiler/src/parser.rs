use sb_core::cosmetic::{CssRule, GLOBAL_DOMAIN};
use sb_core::domain::is_valid_domain;
use sb_core::types::{
    DomainType, NetworkRule, ResourceTypes, RuleAction, RuleId, PRIORITY_BLOCK,
    PRIORITY_EXCEPTION, PRIORITY_IMPORTANT,
};

/// Classification of one filter-list line.
///
/// Every line maps to exactly one variant; malformed lines become
/// `Unparseable` values instead of errors, so a bad line can never abort
/// the surrounding document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Comment, blank, or too-short noise line.
    Skip,
    Network(NetworkRule),
    Cosmetic(CssRule),
    /// Recognized by no dialect; dropped silently.
    Unparseable,
}

/// Resource kinds assumed for a path-style pattern rule.
const URL_PATTERN_TYPES: ResourceTypes = ResourceTypes::SCRIPT
    .union(ResourceTypes::IMAGE)
    .union(ResourceTypes::STYLESHEET)
    .union(ResourceTypes::OBJECT)
    .union(ResourceTypes::XHR);

/// Resource kinds assumed when an option list names none.
const OPTION_FALLBACK_TYPES: ResourceTypes = ResourceTypes::SCRIPT
    .union(ResourceTypes::IMAGE)
    .union(ResourceTypes::STYLESHEET);

/// Classify and parse one raw filter-list line.
///
/// `id` is stamped into the rule when the line produces a network rule;
/// the caller only advances its counter for `Network` outcomes. Dialects
/// are tried in a fixed order and the first match wins.
pub fn parse_line(raw: &str, id: RuleId) -> LineOutcome {
    let line = raw.trim();

    if line.is_empty() || line.starts_with('!') {
        return LineOutcome::Skip;
    }

    if line.len() < 3 {
        return LineOutcome::Skip;
    }

    if let Some((left, selector)) = line.split_once("##") {
        return parse_cosmetic(left, selector);
    }

    if let Some(rest) = line.strip_prefix("@@") {
        return parse_exception(rest, id);
    }

    if line.starts_with('/') && line[1..].contains('/') {
        return parse_url_pattern(line, id);
    }

    if let Some((pattern, options)) = line.split_once('$') {
        return parse_option_rule(pattern, options, id);
    }

    if let Some(rest) = line.strip_prefix("||") {
        return parse_domain_anchor(rest, id);
    }

    LineOutcome::Unparseable
}

fn parse_cosmetic(left: &str, selector: &str) -> LineOutcome {
    let selector = selector.trim();
    if selector.is_empty() {
        return LineOutcome::Unparseable;
    }

    let (is_exception, host) = match left.strip_prefix("@@") {
        Some(rest) => (true, rest),
        None => (false, left),
    };

    let domain = if host.is_empty() {
        GLOBAL_DOMAIN.to_string()
    } else {
        host.to_string()
    };

    LineOutcome::Cosmetic(CssRule {
        domain,
        selector: selector.to_string(),
        is_exception,
    })
}

// Only the `||domain^` shape is supported after `@@`.
fn parse_exception(rest: &str, id: RuleId) -> LineOutcome {
    let host = match rest.strip_prefix("||").and_then(|r| r.strip_suffix('^')) {
        Some(host) => host.to_ascii_lowercase(),
        None => return LineOutcome::Unparseable,
    };

    if !is_valid_domain(&host) {
        return LineOutcome::Unparseable;
    }

    LineOutcome::Network(NetworkRule {
        id,
        priority: PRIORITY_EXCEPTION,
        action: RuleAction::Allow,
        url_filter: format!("||{host}^"),
        resource_types: ResourceTypes::ALL,
        domain_type: None,
        excluded_initiator_domains: Vec::new(),
    })
}

fn parse_url_pattern(line: &str, id: RuleId) -> LineOutcome {
    // Unanchored patterns match as substrings anywhere in the URL.
    let url_filter = if line.starts_with('|') {
        line.to_string()
    } else {
        format!("*{line}*")
    };

    LineOutcome::Network(NetworkRule {
        id,
        priority: PRIORITY_BLOCK,
        action: RuleAction::Block,
        url_filter,
        resource_types: URL_PATTERN_TYPES,
        domain_type: None,
        excluded_initiator_domains: Vec::new(),
    })
}

fn parse_option_rule(pattern: &str, options: &str, id: RuleId) -> LineOutcome {
    if pattern.is_empty() || options.is_empty() {
        return LineOutcome::Unparseable;
    }

    let mut resource_types = ResourceTypes::empty();
    let mut priority = PRIORITY_BLOCK;
    let mut domain_type = None;

    for token in options.split(',') {
        if token == "important" {
            priority = PRIORITY_IMPORTANT;
            continue;
        }
        if token == "third-party" {
            domain_type = Some(DomainType::ThirdParty);
            continue;
        }
        if let Some(kind) = ResourceTypes::from_option_name(token) {
            resource_types |= kind;
        }
        // anything else is ignored
    }

    if resource_types.is_empty() {
        resource_types = OPTION_FALLBACK_TYPES;
    }

    let url_filter = if pattern.starts_with("||") || pattern.contains('*') {
        pattern.to_string()
    } else {
        format!("*{pattern}*")
    };

    LineOutcome::Network(NetworkRule {
        id,
        priority,
        action: RuleAction::Block,
        url_filter,
        resource_types,
        domain_type,
        excluded_initiator_domains: Vec::new(),
    })
}

fn parse_domain_anchor(rest: &str, id: RuleId) -> LineOutcome {
    // Strict `||domain^`, anchor-plus-path, and bare `||domain` shapes all
    // reduce to the text before the first separator.
    let end = rest.find(|c| c == '^' || c == '/').unwrap_or(rest.len());
    let domain = rest[..end].to_ascii_lowercase();

    if !is_valid_domain(&domain) {
        return LineOutcome::Unparseable;
    }

    LineOutcome::Network(NetworkRule {
        id,
        priority: PRIORITY_BLOCK,
        action: RuleAction::Block,
        // The trailing anchor is dropped: the installed filter also matches
        // subdomain and path variants of the host.
        url_filter: format!("||{domain}"),
        resource_types: ResourceTypes::ALL,
        domain_type: None,
        excluded_initiator_domains: Vec::new(),
    })
}
