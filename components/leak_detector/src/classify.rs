//! Heap-node classification
//!
//! One pure function maps a node onto its role, instead of string checks
//! scattered through the detectors. Scores reflect how strong the naming
//! evidence is; callers surface them as finding confidence.

use diag_types::domains::heap::HeapNode;
use diag_types::domains::memory::{Classification, NodeClass};

/// DOM interface names that do not follow the HTML*Element pattern
const DOM_NAMES: &[&str] = &[
    "Text",
    "Comment",
    "Document",
    "DocumentFragment",
    "ShadowRoot",
];

/// Classify a heap node's role from its type and name
pub fn classify_node(node: &HeapNode) -> Classification {
    // The heap profiler prefixes detached DOM wrappers with "Detached "
    if node.name.starts_with("Detached ") {
        return Classification {
            class: NodeClass::Detached,
            score: 0.9,
        };
    }
    if node.node_type == "native" && node.name.contains("Detached") {
        return Classification {
            class: NodeClass::Detached,
            score: 0.75,
        };
    }

    if node.node_type == "closure" {
        return Classification {
            class: NodeClass::Closure,
            score: 0.95,
        };
    }

    if looks_like_dom(&node.name) && (node.node_type == "native" || node.node_type == "object") {
        return Classification {
            class: NodeClass::Dom,
            score: 0.8,
        };
    }

    Classification {
        class: NodeClass::Other,
        score: 0.5,
    }
}

fn looks_like_dom(name: &str) -> bool {
    (name.starts_with("HTML") && name.ends_with("Element"))
        || name.starts_with("SVG")
        || DOM_NAMES.contains(&name)
}
