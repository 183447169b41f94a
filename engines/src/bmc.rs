// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Bounded model checking: the refutation engine.
//!
//! Walks depths upward, reporting counterexamples as invalid verdicts and
//! every cleared depth as base-step progress the proof engines key off.

use lustre::syntax::Expr;

use crate::backends::{CheckOutcome, InductionBackend};
use crate::engine::{Context, Engine, EngineError};
use crate::messages::{
    invalid_itinerary, BaseStepMessage, InvalidMessage, InvariantMessage, Message, MessageHandler,
    UnknownMessage,
};

/// Message source tag.
pub const NAME: &str = "bmc";

/// The bounded model checking shell.
pub struct BmcEngine {
    ctx: Context,
    backend: Box<dyn InductionBackend>,
    invariants: Vec<Expr>,
}

impl BmcEngine {
    /// Wrap a backend.
    pub fn new(ctx: Context, backend: Box<dyn InductionBackend>) -> Self {
        BmcEngine {
            ctx,
            backend,
            invariants: Vec::new(),
        }
    }

    fn process_pending(&mut self) {
        for m in self.ctx.drain() {
            self.ctx.note_settled(&m);
            self.handle_message(&m);
        }
    }

    fn give_up(&self) {
        if !self.ctx.properties.is_empty() {
            self.ctx.publish(Message::Unknown(UnknownMessage {
                source: NAME.to_string(),
                properties: self.ctx.properties.clone(),
            }));
        }
    }
}

impl MessageHandler for BmcEngine {
    fn on_invariant(&mut self, message: &InvariantMessage) {
        self.invariants.extend(message.invariants.iter().cloned());
    }
}

impl Engine for BmcEngine {
    fn name(&self) -> &'static str {
        NAME
    }

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn run(&mut self) -> Result<(), EngineError> {
        for k in 0..=self.ctx.settings.max_depth {
            self.process_pending();
            if self.ctx.stop_requested() || self.ctx.properties.is_empty() {
                return Ok(());
            }
            // a depth can hold several counterexamples; keep querying it
            // until the remaining properties come back clear
            loop {
                match self
                    .backend
                    .base_case(k, &self.ctx.properties, &self.invariants)?
                {
                    CheckOutcome::Violation { properties, model } => {
                        let refuted: Vec<String> = properties
                            .into_iter()
                            .filter(|p| self.ctx.properties.contains(p))
                            .collect();
                        if refuted.is_empty() {
                            // stale violation for properties settled elsewhere
                            break;
                        }
                        self.ctx.retire(&refuted);
                        self.ctx.publish(Message::Invalid(InvalidMessage {
                            source: NAME.to_string(),
                            properties: refuted,
                            length: k + 1,
                            model,
                            itinerary: invalid_itinerary(&self.ctx.settings),
                        }));
                        if self.ctx.properties.is_empty() {
                            return Ok(());
                        }
                    }
                    CheckOutcome::Clear { .. } => {
                        self.ctx.publish(Message::BaseStep(BaseStepMessage {
                            step: k,
                            properties: self.ctx.properties.clone(),
                        }));
                        break;
                    }
                    CheckOutcome::Unknown => {
                        self.give_up();
                        return Ok(());
                    }
                }
            }
        }
        self.give_up();
        Ok(())
    }
}
