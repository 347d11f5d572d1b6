//! Property-based tests for the store's pure helpers

use super::state::{derive_name, MessageStatus, DEFAULT_CONVERSATION_NAME};
use crate::responder::{self, FALLBACK_REPLY, RESPONSES};
use proptest::prelude::*;

fn arb_status() -> impl Strategy<Value = MessageStatus> {
    prop_oneof![
        Just(MessageStatus::Sent),
        Just(MessageStatus::Delivered),
        Just(MessageStatus::Read),
    ]
}

proptest! {
    #[test]
    fn derived_name_is_bounded_and_clean(content in ".*") {
        let name = derive_name(&content);
        if name == DEFAULT_CONVERSATION_NAME {
            return Ok(());
        }
        prop_assert!(!name.is_empty());
        prop_assert!(name.chars().count() <= 30);
        prop_assert!(name.chars().all(|c| c.is_alphanumeric() || c.is_whitespace()));
    }

    #[test]
    fn derived_name_is_deterministic(content in ".*") {
        prop_assert_eq!(derive_name(&content), derive_name(&content));
    }

    /// The guarded transition never moves a status backwards, whatever
    /// sequence of requested targets it sees.
    #[test]
    fn guarded_status_never_regresses(
        targets in proptest::collection::vec(arb_status(), 0..12)
    ) {
        let mut status = MessageStatus::Sent;
        for target in targets {
            let before = status;
            if status.advances_to(target) {
                status = target;
            }
            prop_assert!(status >= before);
        }
    }

    /// The responder is total: every utterance maps to a table reply or the
    /// fixed fallback, and never panics.
    #[test]
    fn responder_is_total(utterance in ".*") {
        let reply = responder::respond(&utterance);
        prop_assert!(
            reply == FALLBACK_REPLY || RESPONSES.iter().any(|(_, r)| *r == reply)
        );
    }
}
