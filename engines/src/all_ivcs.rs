// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! All-cores extraction: the last stop on the valid-message route.

use std::collections::VecDeque;
use std::time::Duration;

use crate::backends::AllIvcsBackend;
use crate::engine::{Context, Engine, EngineError};
use crate::messages::{EngineType, Message, MessageHandler, ValidMessage};

/// Message source tag.
pub const NAME: &str = "all-ivcs";

/// The core enumeration shell.
pub struct AllIvcsEngine {
    ctx: Context,
    backend: Box<dyn AllIvcsBackend>,
    pending: VecDeque<ValidMessage>,
}

impl AllIvcsEngine {
    /// Wrap a backend.
    pub fn new(ctx: Context, backend: Box<dyn AllIvcsBackend>) -> Self {
        AllIvcsEngine {
            ctx,
            backend,
            pending: VecDeque::new(),
        }
    }
}

impl MessageHandler for AllIvcsEngine {
    fn on_valid(&mut self, message: &ValidMessage) {
        if message.itinerary.next_destination() == Some(EngineType::IvcReductionAll) {
            self.pending.push_back(message.clone());
        }
    }
}

impl Engine for AllIvcsEngine {
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
                for property in &m.properties {
                    let outcome = self.backend.enumerate(property, m.k, &m.ivc)?;
                    self.ctx.publish(Message::Valid(ValidMessage {
                        source: m.source.clone(),
                        properties: vec![property.clone()],
                        k: m.k,
                        proof_time: m.proof_time,
                        invariants: m.invariants.clone(),
                        ivc: m.ivc.clone(),
                        all_ivcs: outcome.cores,
                        mivc_timed_out: m.mivc_timed_out || outcome.timed_out,
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
