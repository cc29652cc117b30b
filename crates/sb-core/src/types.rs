//! Core type definitions for SlateBlock
//!
//! These types describe the normalized network rules handed to the
//! declarative matching backend. Serialized field names follow the
//! backend's JSON rule format (camelCase).

use serde::{Serialize, Serializer};

// =============================================================================
// Rule Ids
// =============================================================================

/// Identifier of an installed rule. Assigned sequentially from 1 during
/// compilation; unique within one compiled rule set.
pub type RuleId = u32;

// =============================================================================
// Rule Actions
// =============================================================================

/// Action to take for a matched rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum RuleAction {
    /// Exception rule (@@...) - allows the request
    Allow = 0,
    /// Block rule - cancels the request
    Block = 1,
}

// =============================================================================
// Rule Priorities
// =============================================================================

// Priorities are plain integers so they serialize directly as the backend's
// priority field. Exception rules must always outrank default block rules.

/// Default priority for block rules.
pub const PRIORITY_BLOCK: u32 = 1;
/// Priority for exception (allow) rules.
pub const PRIORITY_EXCEPTION: u32 = 2;
/// Priority for rules carrying the `important` modifier.
pub const PRIORITY_IMPORTANT: u32 = 3;

// =============================================================================
// Resource Types
// =============================================================================

bitflags::bitflags! {
    /// Resource kind bit mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResourceTypes: u16 {
        const SCRIPT = 1 << 0;
        const IMAGE = 1 << 1;
        const STYLESHEET = 1 << 2;
        const OBJECT = 1 << 3;
        const XHR = 1 << 4;
        const SUB_FRAME = 1 << 5;
        const PING = 1 << 6;
        const CSP_REPORT = 1 << 7;
        const MEDIA = 1 << 8;
        const FONT = 1 << 9;
        const WEBSOCKET = 1 << 10;
        const OTHER = 1 << 11;

        /// All resource kinds
        const ALL = 0x0FFF;
    }
}

/// Flag-to-name pairs in serialization order.
const RESOURCE_TYPE_NAMES: [(ResourceTypes, &str); 12] = [
    (ResourceTypes::SCRIPT, "script"),
    (ResourceTypes::IMAGE, "image"),
    (ResourceTypes::STYLESHEET, "stylesheet"),
    (ResourceTypes::OBJECT, "object"),
    (ResourceTypes::XHR, "xhr"),
    (ResourceTypes::SUB_FRAME, "sub_frame"),
    (ResourceTypes::PING, "ping"),
    (ResourceTypes::CSP_REPORT, "csp_report"),
    (ResourceTypes::MEDIA, "media"),
    (ResourceTypes::FONT, "font"),
    (ResourceTypes::WEBSOCKET, "websocket"),
    (ResourceTypes::OTHER, "other"),
];

impl ResourceTypes {
    /// Parse from a filter-list option token.
    pub fn from_option_name(name: &str) -> Option<Self> {
        match name {
            "script" => Some(Self::SCRIPT),
            "image" => Some(Self::IMAGE),
            "stylesheet" => Some(Self::STYLESHEET),
            "object" => Some(Self::OBJECT),
            "xhr" => Some(Self::XHR),
            "sub_frame" => Some(Self::SUB_FRAME),
            "ping" => Some(Self::PING),
            "csp_report" => Some(Self::CSP_REPORT),
            "media" => Some(Self::MEDIA),
            "font" => Some(Self::FONT),
            "websocket" => Some(Self::WEBSOCKET),
            "other" => Some(Self::OTHER),
            _ => None,
        }
    }

    /// Names of the kinds present in this mask, in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        RESOURCE_TYPE_NAMES
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
    }
}

impl Serialize for ResourceTypes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.names())
    }
}

// =============================================================================
// Domain Type
// =============================================================================

/// Party restriction carried by a `third-party` modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DomainType {
    FirstParty,
    ThirdParty,
}

// =============================================================================
// Network Rule
// =============================================================================

/// One blocking or allow directive, normalized for the matching backend.
///
/// `id` is immutable after creation. `excluded_initiator_domains` is empty
/// at parse time and populated during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRule {
    pub id: RuleId,
    pub priority: u32,
    pub action: RuleAction,
    /// `||host` anchor, plain substring, or `*` wildcard pattern. Non-empty.
    pub url_filter: String,
    /// Never empty on an emitted rule.
    pub resource_types: ResourceTypes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_type: Option<DomainType>,
    /// Whitelisted initiator domains this rule must not apply to.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_initiator_domains: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_names_round_trip() {
        for (flag, name) in RESOURCE_TYPE_NAMES {
            assert_eq!(ResourceTypes::from_option_name(name), Some(flag));
        }
        assert_eq!(ResourceTypes::from_option_name("subdocument"), None);
        assert_eq!(ResourceTypes::from_option_name(""), None);
    }

    #[test]
    fn test_all_covers_every_kind() {
        let mut acc = ResourceTypes::empty();
        for (flag, _) in RESOURCE_TYPE_NAMES {
            acc |= flag;
        }
        assert_eq!(acc, ResourceTypes::ALL);
        assert_eq!(ResourceTypes::ALL.names().count(), 12);
    }

    #[test]
    fn test_rule_json_shape() {
        let rule = NetworkRule {
            id: 7,
            priority: PRIORITY_BLOCK,
            action: RuleAction::Block,
            url_filter: "||ads.example.com".to_string(),
            resource_types: ResourceTypes::SCRIPT | ResourceTypes::IMAGE,
            domain_type: Some(DomainType::ThirdParty),
            excluded_initiator_domains: Vec::new(),
        };

        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["priority"], 1);
        assert_eq!(value["action"], "block");
        assert_eq!(value["urlFilter"], "||ads.example.com");
        assert_eq!(
            value["resourceTypes"],
            serde_json::json!(["script", "image"])
        );
        assert_eq!(value["domainType"], "thirdParty");
        // Empty exclusion list is omitted from the artifact
        assert!(value.get("excludedInitiatorDomains").is_none());
    }

    #[test]
    fn test_rule_json_includes_exclusions_when_present() {
        let rule = NetworkRule {
            id: 1,
            priority: PRIORITY_EXCEPTION,
            action: RuleAction::Allow,
            url_filter: "||trusted.example^".to_string(),
            resource_types: ResourceTypes::ALL,
            domain_type: None,
            excluded_initiator_domains: vec!["good.example".to_string()],
        };

        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(value["action"], "allow");
        assert_eq!(
            value["excludedInitiatorDomains"],
            serde_json::json!(["good.example"])
        );
        assert!(value.get("domainType").is_none());
    }
}
