#![allow(dead_code)]
use consul_notify::core::{CheckStatus, Message, Messages};

/// Creates a node-level check result with the given status.
pub fn create_test_message(node: &str, status: Option<CheckStatus>) -> Message {
    Message {
        node: node.to_string(),
        check_id: "serfHealth".to_string(),
        check: "Serf Health Status".to_string(),
        status,
        ..Default::default()
    }
}

/// Creates a batch with one message per status, in order.
pub fn create_test_batch(statuses: &[Option<CheckStatus>]) -> Messages {
    statuses
        .iter()
        .enumerate()
        .map(|(i, status)| create_test_message(&format!("node-{}", i), *status))
        .collect()
}
