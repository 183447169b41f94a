// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The events engines and the director exchange.
//!
//! Messages are a closed sum: every inter-engine event is one of the
//! variants below, and components receive them through the
//! [`MessageHandler`] dispatch trait. The routable kinds carry an
//! [`Itinerary`] of further engine destinations; a message whose itinerary
//! is exhausted is terminal and may settle properties at the director.

use std::collections::BTreeSet;

use lustre::semantics::Model;
use lustre::syntax::Expr;
use results::AllIvcs;

mod handler;
mod itinerary;

pub use handler::MessageHandler;
pub use itinerary::{invalid_itinerary, valid_itinerary, EngineType, Itinerary};

/// Properties proven valid at depth `k`, with everything learned on the
/// way.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidMessage {
    /// Name of the engine that found the proof
    pub source: String,
    /// The proven properties
    pub properties: Vec<String>,
    /// Proof depth
    pub k: usize,
    /// Solver time spent on the proof, in seconds (negative when the
    /// source does not track it)
    pub proof_time: f64,
    /// Invariants the proof used, for cross-engine reuse
    pub invariants: Vec<Expr>,
    /// Inductive validity core, when the source computed one
    pub ivc: BTreeSet<String>,
    /// Every enumerated core, when the all-cores engine ran
    pub all_ivcs: Vec<AllIvcs>,
    /// Whether core minimization gave up before finishing
    pub mivc_timed_out: bool,
    /// Remaining engine destinations before the message is terminal
    pub itinerary: Itinerary,
}

/// Properties refuted by a counterexample.
#[derive(Clone, Debug, PartialEq)]
pub struct InvalidMessage {
    /// Name of the engine that found the counterexample
    pub source: String,
    /// The refuted properties
    pub properties: Vec<String>,
    /// Counterexample length in steps
    pub length: usize,
    /// The solver model the counterexample is extracted from
    pub model: Model,
    /// Remaining engine destinations before the message is terminal
    pub itinerary: Itinerary,
}

/// A counterexample to the inductive step only. Purely informational: the
/// property may still hold.
#[derive(Clone, Debug, PartialEq)]
pub struct InductiveCounterexampleMessage {
    /// The affected properties
    pub properties: Vec<String>,
    /// Trace length in steps
    pub length: usize,
    /// The solver model of the trace
    pub model: Model,
}

/// An engine gave up on these properties.
#[derive(Clone, Debug, PartialEq)]
pub struct UnknownMessage {
    /// Name of the engine giving up (or the director, re-broadcasting a
    /// committed unknown verdict)
    pub source: String,
    /// The abandoned properties
    pub properties: Vec<String>,
}

/// Bounded model checking reached depth `step` without refuting the named
/// properties.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseStepMessage {
    /// The cleared depth
    pub step: usize,
    /// Properties still standing at that depth
    pub properties: Vec<String>,
}

/// Invariants learned and broadcast for cross-engine reuse.
#[derive(Clone, Debug, PartialEq)]
pub struct InvariantMessage {
    /// The learned invariants
    pub invariants: Vec<Expr>,
}

/// Any inter-engine event.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Message {
    Valid(ValidMessage),
    Invalid(InvalidMessage),
    InductiveCounterexample(InductiveCounterexampleMessage),
    Unknown(UnknownMessage),
    BaseStep(BaseStepMessage),
    Invariant(InvariantMessage),
}
