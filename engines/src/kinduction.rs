// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! k-induction: the workhorse proof engine.
//!
//! Proves properties whose inductive step closes at some depth, waiting at
//! each depth for bounded model checking to cover the matching base case.
//! Step counterexamples are published for the unknown reports; they refute
//! nothing.

use std::time::{Duration, Instant};

use lustre::syntax::Expr;

use crate::backends::{CheckOutcome, InductionBackend};
use crate::engine::{Context, Engine, EngineError};
use crate::messages::{
    valid_itinerary, BaseStepMessage, InductiveCounterexampleMessage, InvariantMessage, Message,
    MessageHandler, UnknownMessage, ValidMessage,
};

/// Message source tag.
pub const NAME: &str = "k-induction";

/// The k-induction shell.
pub struct KInductionEngine {
    ctx: Context,
    backend: Box<dyn InductionBackend>,
    invariants: Vec<Expr>,
    base_step: usize,
}

impl KInductionEngine {
    /// Wrap a backend.
    pub fn new(ctx: Context, backend: Box<dyn InductionBackend>) -> Self {
        KInductionEngine {
            ctx,
            backend,
            invariants: Vec::new(),
            base_step: 0,
        }
    }

    fn process_pending(&mut self) {
        for m in self.ctx.drain() {
            self.ctx.note_settled(&m);
            self.handle_message(&m);
        }
    }

    /// An inductive step at depth `k` only proves properties whose base
    /// case is covered through `k - 1`; wait for bounded model checking
    /// to get there. Without a bounded model checking engine the backend
    /// covers its own base cases and there is nothing to wait for.
    fn await_base_step(&mut self, k: usize) {
        if !self.ctx.settings.bounded_model_checking {
            return;
        }
        while self.base_step + 1 < k
            && !self.ctx.stop_requested()
            && !self.ctx.properties.is_empty()
        {
            if let Some(m) = self.ctx.next_message(Duration::from_millis(100)) {
                self.ctx.note_settled(&m);
                self.handle_message(&m);
            }
        }
    }
}

impl MessageHandler for KInductionEngine {
    fn on_base_step(&mut self, message: &BaseStepMessage) {
        self.base_step = message.step;
    }

    fn on_invariant(&mut self, message: &InvariantMessage) {
        self.invariants.extend(message.invariants.iter().cloned());
    }
}

impl Engine for KInductionEngine {
    fn name(&self) -> &'static str {
        NAME
    }

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn run(&mut self) -> Result<(), EngineError> {
        for k in 1..=self.ctx.settings.max_depth {
            self.await_base_step(k);
            self.process_pending();
            if self.ctx.stop_requested() || self.ctx.properties.is_empty() {
                return Ok(());
            }
            let started = Instant::now();
            match self
                .backend
                .inductive_step(k, &self.ctx.properties, &self.invariants)?
            {
                CheckOutcome::Clear { ivc } => {
                    let properties = self.ctx.properties.clone();
                    self.ctx.retire(&properties);
                    self.ctx.publish(Message::Valid(ValidMessage {
                        source: NAME.to_string(),
                        properties,
                        k,
                        proof_time: started.elapsed().as_secs_f64(),
                        invariants: self.invariants.clone(),
                        ivc,
                        all_ivcs: vec![],
                        mivc_timed_out: false,
                        itinerary: valid_itinerary(&self.ctx.settings),
                    }));
                    return Ok(());
                }
                CheckOutcome::Violation { properties, model } => {
                    self.ctx
                        .publish(Message::InductiveCounterexample(
                            InductiveCounterexampleMessage {
                                properties,
                                length: k,
                                model,
                            },
                        ));
                }
                CheckOutcome::Unknown => break,
            }
        }
        if !self.ctx.properties.is_empty() {
            self.ctx.publish(Message::Unknown(UnknownMessage {
                source: NAME.to_string(),
                properties: self.ctx.properties.clone(),
            }));
        }
        Ok(())
    }
}
