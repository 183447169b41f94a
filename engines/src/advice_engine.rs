// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Advice ingestion: replays hints persisted by an earlier run.

use crate::advice::Advice;
use crate::backends::AdviceBackend;
use crate::engine::{Context, Engine, EngineError};
use crate::messages::{InvariantMessage, Message, MessageHandler};

/// Message source tag.
pub const NAME: &str = "advice";

/// Confirms stored invariants against the current program and broadcasts
/// the survivors once.
pub struct AdviceEngine {
    ctx: Context,
    backend: Box<dyn AdviceBackend>,
    advice: Advice,
}

impl AdviceEngine {
    /// Wrap a backend and the hints read at construction.
    pub fn new(ctx: Context, backend: Box<dyn AdviceBackend>, advice: Advice) -> Self {
        AdviceEngine {
            ctx,
            backend,
            advice,
        }
    }
}

impl MessageHandler for AdviceEngine {}

impl Engine for AdviceEngine {
    fn name(&self) -> &'static str {
        NAME
    }

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn run(&mut self) -> Result<(), EngineError> {
        if self.ctx.stop_requested() || self.advice.invariants.is_empty() {
            return Ok(());
        }
        let invariants = self.backend.confirm(&self.advice.invariants)?;
        if !invariants.is_empty() {
            self.ctx
                .publish(Message::Invariant(InvariantMessage { invariants }));
        }
        Ok(())
    }
}
