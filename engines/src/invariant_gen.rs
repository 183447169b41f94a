// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Invariant generation: feeds the proof engines.

use crate::backends::InvariantBackend;
use crate::engine::{Context, Engine, EngineError};
use crate::messages::{InvariantMessage, Message, MessageHandler};

/// Message source tag.
pub const NAME: &str = "invariant-generation";

/// Streams candidate invariant rounds from its backend as broadcasts.
pub struct InvariantGenerationEngine {
    ctx: Context,
    backend: Box<dyn InvariantBackend>,
}

impl InvariantGenerationEngine {
    /// Wrap a backend.
    pub fn new(ctx: Context, backend: Box<dyn InvariantBackend>) -> Self {
        InvariantGenerationEngine { ctx, backend }
    }

    fn process_pending(&mut self) {
        for m in self.ctx.drain() {
            self.ctx.note_settled(&m);
            self.handle_message(&m);
        }
    }
}

impl MessageHandler for InvariantGenerationEngine {}

impl Engine for InvariantGenerationEngine {
    fn name(&self) -> &'static str {
        NAME
    }

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn run(&mut self) -> Result<(), EngineError> {
        loop {
            self.process_pending();
            if self.ctx.stop_requested() || self.ctx.properties.is_empty() {
                return Ok(());
            }
            match self.backend.next_round()? {
                Some(invariants) => {
                    if !invariants.is_empty() {
                        self.ctx
                            .publish(Message::Invariant(InvariantMessage { invariants }));
                    }
                }
                None => return Ok(()),
            }
        }
    }
}
