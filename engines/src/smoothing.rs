// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Counterexample smoothing: a service engine on the invalid-message
//! route.
//!
//! Invalid verdicts whose itinerary points here are re-published with a
//! model that changes inputs as little as possible, and an advanced
//! itinerary. Roster bookkeeping stays with the director.

use std::collections::VecDeque;
use std::time::Duration;

use crate::backends::SmoothingBackend;
use crate::engine::{Context, Engine, EngineError};
use crate::messages::{EngineType, InvalidMessage, Message, MessageHandler};

/// Message source tag.
pub const NAME: &str = "smoothing";

/// The smoothing shell.
pub struct SmoothingEngine {
    ctx: Context,
    backend: Box<dyn SmoothingBackend>,
    pending: VecDeque<InvalidMessage>,
}

impl SmoothingEngine {
    /// Wrap a backend.
    pub fn new(ctx: Context, backend: Box<dyn SmoothingBackend>) -> Self {
        SmoothingEngine {
            ctx,
            backend,
            pending: VecDeque::new(),
        }
    }
}

impl MessageHandler for SmoothingEngine {
    fn on_invalid(&mut self, message: &InvalidMessage) {
        if message.itinerary.next_destination() == Some(EngineType::Smoothing) {
            self.pending.push_back(message.clone());
        }
    }
}

impl Engine for SmoothingEngine {
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
                let model = self.backend.smooth(&m.properties, m.length, &m.model)?;
                self.ctx.publish(Message::Invalid(InvalidMessage {
                    source: m.source,
                    properties: m.properties,
                    length: m.length,
                    model,
                    itinerary: m.itinerary.advanced(),
                }));
            }
            if self.ctx.properties.is_empty() {
                return Ok(());
            }
        }
        Ok(())
    }
}
