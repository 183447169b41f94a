// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Minimal inductive-validity-core reduction: a service engine on the
//! valid-message route.
//!
//! Valid verdicts whose itinerary points here are re-published per
//! property with a minimized core and an advanced itinerary.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::backends::IvcBackend;
use crate::engine::{Context, Engine, EngineError};
use crate::messages::{EngineType, Message, MessageHandler, ValidMessage};

/// Message source tag.
pub const NAME: &str = "ivc-reduction";

/// The core reduction shell.
pub struct IvcReductionEngine {
    ctx: Context,
    backend: Box<dyn IvcBackend>,
    pending: VecDeque<ValidMessage>,
}

impl IvcReductionEngine {
    /// Wrap a backend.
    pub fn new(ctx: Context, backend: Box<dyn IvcBackend>) -> Self {
        IvcReductionEngine {
            ctx,
            backend,
            pending: VecDeque::new(),
        }
    }
}

impl MessageHandler for IvcReductionEngine {
    fn on_valid(&mut self, message: &ValidMessage) {
        if message.itinerary.next_destination() == Some(EngineType::IvcReduction) {
            self.pending.push_back(message.clone());
        }
    }
}

impl Engine for IvcReductionEngine {
    fn name(&self) -> &'static str {
        NAME
    }

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn run(&mut self) -> Result<(), EngineError> {
        while !self.ctx.stop_requested() {
            if let Some(m) = self.ctx.next_message(Duration::from_millis(100)) {
                self.ctx.note_settled(&m);
                self.handle_message(&m);
            }
            while let Some(m) = self.pending.pop_front() {
                let started = Instant::now();
                for property in &m.properties {
                    let outcome =
                        self.backend
                            .reduce(property, m.k, &m.invariants, &m.ivc)?;
                    self.ctx.publish(Message::Valid(ValidMessage {
                        source: m.source.clone(),
                        properties: vec![property.clone()],
                        k: m.k,
                        proof_time: m.proof_time.max(0.0) + started.elapsed().as_secs_f64(),
                        invariants: m.invariants.clone(),
                        ivc: outcome.core,
                        all_ivcs: m.all_ivcs.clone(),
                        mivc_timed_out: outcome.timed_out,
                        itinerary: m.itinerary.advanced(),
                    }));
                }
            }
            if self.ctx.properties.is_empty() {
                return Ok(());
            }
        }
        Ok(())
    }
}
