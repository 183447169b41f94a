// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Dispatch trait components implement to receive messages by variant.

use super::{
    BaseStepMessage, InductiveCounterexampleMessage, InvalidMessage, InvariantMessage, Message,
    UnknownMessage, ValidMessage,
};

/// Receives messages, one method per variant. Every method defaults to
/// ignoring its message, so components override only the kinds they care
/// about and stay oblivious to the rest of the taxonomy.
pub trait MessageHandler {
    /// A valid verdict (possibly still in transit along its itinerary).
    fn on_valid(&mut self, _message: &ValidMessage) {}

    /// An invalid verdict (possibly still in transit along its itinerary).
    fn on_invalid(&mut self, _message: &InvalidMessage) {}

    /// A counterexample to the inductive step.
    fn on_inductive_counterexample(&mut self, _message: &InductiveCounterexampleMessage) {}

    /// An engine gave up on properties.
    fn on_unknown(&mut self, _message: &UnknownMessage) {}

    /// Bounded model checking progress.
    fn on_base_step(&mut self, _message: &BaseStepMessage) {}

    /// Invariants broadcast for reuse.
    fn on_invariant(&mut self, _message: &InvariantMessage) {}

    /// Dispatch a message to the method for its variant.
    fn handle_message(&mut self, message: &Message) {
        match message {
            Message::Valid(m) => self.on_valid(m),
            Message::Invalid(m) => self.on_invalid(m),
            Message::InductiveCounterexample(m) => self.on_inductive_counterexample(m),
            Message::Unknown(m) => self.on_unknown(m),
            Message::BaseStep(m) => self.on_base_step(m),
            Message::Invariant(m) => self.on_invariant(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingHandler {
        base_steps: Vec<usize>,
        others: usize,
    }

    impl MessageHandler for CountingHandler {
        fn on_base_step(&mut self, message: &BaseStepMessage) {
            self.base_steps.push(message.step);
        }

        fn on_unknown(&mut self, _message: &UnknownMessage) {
            self.others += 1;
        }
    }

    #[test]
    fn test_dispatch_by_variant() {
        let mut handler = CountingHandler::default();
        handler.handle_message(&Message::BaseStep(BaseStepMessage {
            step: 4,
            properties: vec![],
        }));
        handler.handle_message(&Message::Unknown(UnknownMessage {
            source: "bmc".to_string(),
            properties: vec!["p".to_string()],
        }));
        // unhandled variants fall through to the default no-op
        handler.handle_message(&Message::Invariant(InvariantMessage { invariants: vec![] }));

        assert_eq!(handler.base_steps, vec![4]);
        assert_eq!(handler.others, 1);
    }
}
