// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Property-directed reachability: the incremental proof engine.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use crate::backends::{PdrBackend, PdrOutcome};
use crate::engine::{Context, Engine, EngineError};
use crate::messages::{
    invalid_itinerary, valid_itinerary, InvalidMessage, Message, MessageHandler, UnknownMessage,
    ValidMessage,
};

/// Message source tag.
pub const NAME: &str = "pdr";

/// The PDR shell. Sweeps at most `pdr_max` properties per round, asking
/// the backend to push frames for each.
pub struct PdrEngine {
    ctx: Context,
    backend: Box<dyn PdrBackend>,
}

impl PdrEngine {
    /// Wrap a backend.
    pub fn new(ctx: Context, backend: Box<dyn PdrBackend>) -> Self {
        PdrEngine { ctx, backend }
    }

    fn process_pending(&mut self) {
        for m in self.ctx.drain() {
            self.ctx.note_settled(&m);
            self.handle_message(&m);
        }
    }
}

impl MessageHandler for PdrEngine {}

impl Engine for PdrEngine {
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
            let sweep: Vec<String> = self
                .ctx
                .properties
                .iter()
                .take(self.ctx.settings.pdr_max.max(1))
                .cloned()
                .collect();
            let mut decided = false;
            for property in sweep {
                if !self.ctx.properties.contains(&property) {
                    continue;
                }
                let started = Instant::now();
                match self.backend.advance(&property)? {
                    PdrOutcome::Proved { k, invariants } => {
                        decided = true;
                        self.ctx.retire(std::slice::from_ref(&property));
                        self.ctx.publish(Message::Valid(ValidMessage {
                            source: NAME.to_string(),
                            properties: vec![property],
                            k,
                            proof_time: started.elapsed().as_secs_f64(),
                            invariants,
                            ivc: BTreeSet::new(),
                            all_ivcs: vec![],
                            mivc_timed_out: false,
                            itinerary: valid_itinerary(&self.ctx.settings),
                        }));
                    }
                    PdrOutcome::Disproved { length, model } => {
                        decided = true;
                        self.ctx.retire(std::slice::from_ref(&property));
                        self.ctx.publish(Message::Invalid(InvalidMessage {
                            source: NAME.to_string(),
                            properties: vec![property],
                            length,
                            model,
                            itinerary: invalid_itinerary(&self.ctx.settings),
                        }));
                    }
                    PdrOutcome::Exhausted => {
                        decided = true;
                        self.ctx.retire(std::slice::from_ref(&property));
                        self.ctx.publish(Message::Unknown(UnknownMessage {
                            source: NAME.to_string(),
                            properties: vec![property],
                        }));
                    }
                    PdrOutcome::Pending => {}
                }
            }
            if !decided {
                // all frames pushed without a verdict; let messages land
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }
}
