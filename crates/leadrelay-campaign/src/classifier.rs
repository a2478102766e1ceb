// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead-interest classification by trigger phrases.
//!
//! Plain case-insensitive substring matching. There is no stemming and no
//! negation handling, so "not interested" counts as interest.

/// Phrases that mark a lead as interested when they appear on either side.
pub const TRIGGER_WORDS: &[&str] = &[
    "book",
    "schedule",
    "appointment",
    "consultation",
    "interested",
    "learn more",
];

/// Which side of the exchange matched a trigger phrase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterestSignal {
    pub from_user: bool,
    pub from_reply: bool,
}

impl InterestSignal {
    pub fn is_interested(&self) -> bool {
        self.from_user || self.from_reply
    }
}

fn contains_trigger(text: &str) -> bool {
    let lowered = text.to_lowercase();
    TRIGGER_WORDS.iter().any(|word| lowered.contains(word))
}

pub fn classify(user_text: &str, reply: &str) -> InterestSignal {
    InterestSignal {
        from_user: contains_trigger(user_text),
        from_reply: contains_trigger(reply),
    }
}

/// Whether either the inbound text or the generated reply signals interest.
pub fn is_lead_interested(user_text: &str, reply: &str) -> bool {
    classify(user_text, reply).is_interested()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn booking_request_is_interested() {
        assert!(is_lead_interested(
            "I'd like to book a consultation",
            "Sure, when suits you?"
        ));
    }

    #[test]
    fn reply_side_match_counts() {
        let signal = classify("hi", "Would you like to Schedule a call?");
        assert!(!signal.from_user);
        assert!(signal.from_reply);
        assert!(signal.is_interested());
    }

    #[test]
    fn no_trigger_is_not_interested() {
        assert!(!is_lead_interested("Who is this?", "This is Lisa from the studio."));
    }

    #[test]
    fn negation_still_triggers() {
        assert!(is_lead_interested("I'm not interested", "Okay, no worries."));
    }

    #[test]
    fn multi_word_trigger() {
        assert!(is_lead_interested("I want to LEARN MORE", ""));
        assert!(!is_lead_interested("learn", "more"));
    }

    proptest! {
        #[test]
        fn classification_is_symmetric(a in "[a-z ]{0,30}", b in "[a-z ]{0,30}") {
            prop_assert_eq!(is_lead_interested(&a, &b), is_lead_interested(&b, &a));
        }

        #[test]
        fn trigger_on_either_side_is_interested(
            filler in "[xyz ]{0,20}",
            idx in 0..TRIGGER_WORDS.len(),
            on_user in any::<bool>(),
        ) {
            let text = format!("{filler}{}{filler}", TRIGGER_WORDS[idx]);
            let (user, reply) = if on_user { (text.as_str(), filler.as_str()) } else { (filler.as_str(), text.as_str()) };
            prop_assert!(is_lead_interested(user, reply));
        }
    }
}
