// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The solver seam.
//!
//! Engines in this crate are message-level shells; the solver-driven
//! algorithm behind each one lives outside, behind the traits below. A
//! host supplies one boxed backend per engine it enables through
//! [`Backends`]; tests script them.

use std::collections::BTreeSet;

use lustre::semantics::Model;
use lustre::syntax::Expr;
use results::AllIvcs;

use crate::engine::EngineError;

/// The answer to one bounded query.
#[derive(Clone, Debug, PartialEq)]
pub enum CheckOutcome {
    /// No violation at this depth. Proof-oriented queries attach the
    /// unsat-core-derived validity core; refutation-oriented ones leave it
    /// empty.
    Clear {
        /// Core elements the proof relied on
        ivc: BTreeSet<String>,
    },
    /// Some properties are violated by the returned model.
    Violation {
        /// The violated properties
        properties: Vec<String>,
        /// A trace witnessing the violation
        model: Model,
    },
    /// The solver could not decide at this depth.
    Unknown,
}

/// Bounded base-case and inductive-step queries, for the unrolling
/// engines.
pub trait InductionBackend: Send {
    /// Search for a counterexample of depth `k` from the initial state.
    fn base_case(
        &mut self,
        k: usize,
        properties: &[String],
        invariants: &[Expr],
    ) -> Result<CheckOutcome, EngineError>;

    /// Check the inductive step of depth `k` under the given invariants.
    fn inductive_step(
        &mut self,
        k: usize,
        properties: &[String],
        invariants: &[Expr],
    ) -> Result<CheckOutcome, EngineError>;
}

/// One round of frame advancement for a property.
#[derive(Clone, Debug, PartialEq)]
pub enum PdrOutcome {
    /// An inductive invariant proves the property.
    Proved {
        /// Frame the proof closed at
        k: usize,
        /// The strengthened invariant, clause by clause
        invariants: Vec<Expr>,
    },
    /// A concrete trace refutes the property.
    Disproved {
        /// Trace length in steps
        length: usize,
        /// The trace
        model: Model,
    },
    /// Frames were extended but nothing is decided yet.
    Pending,
    /// The backend has given up on this property.
    Exhausted,
}

/// Property-directed reachability, one property at a time.
pub trait PdrBackend: Send {
    /// Push frames for `property` and report where that left it.
    fn advance(&mut self, property: &str) -> Result<PdrOutcome, EngineError>;
}

/// Candidate invariant generation, in rounds.
pub trait InvariantBackend: Send {
    /// The next batch of candidates that survived filtering, or `None`
    /// when the generator is exhausted.
    fn next_round(&mut self) -> Result<Option<Vec<Expr>>, EngineError>;
}

/// Counterexample smoothing: minimize input changes without changing the
/// violation.
pub trait SmoothingBackend: Send {
    /// A smoothed model for the same violation.
    fn smooth(
        &mut self,
        properties: &[String],
        length: usize,
        model: &Model,
    ) -> Result<Model, EngineError>;
}

/// The result of minimal-core reduction.
#[derive(Clone, Debug, PartialEq)]
pub struct IvcOutcome {
    /// The reduced core
    pub core: BTreeSet<String>,
    /// Whether minimization stopped early on its own budget
    pub timed_out: bool,
}

/// Minimal inductive-validity-core reduction.
pub trait IvcBackend: Send {
    /// Shrink `ivc` to a minimal core still proving `property` at `k`.
    fn reduce(
        &mut self,
        property: &str,
        k: usize,
        invariants: &[Expr],
        ivc: &BTreeSet<String>,
    ) -> Result<IvcOutcome, EngineError>;
}

/// The result of all-cores enumeration.
#[derive(Clone, Debug, PartialEq)]
pub struct AllIvcsOutcome {
    /// Every core found
    pub cores: Vec<AllIvcs>,
    /// Whether enumeration stopped early on its own budget
    pub timed_out: bool,
}

/// Exhaustive validity-core enumeration.
pub trait AllIvcsBackend: Send {
    /// Enumerate the validity cores of `property` at `k`.
    fn enumerate(
        &mut self,
        property: &str,
        k: usize,
        ivc: &BTreeSet<String>,
    ) -> Result<AllIvcsOutcome, EngineError>;
}

/// Confirmation of persisted hints against the current program.
pub trait AdviceBackend: Send {
    /// The subset of stored invariants that still hold.
    fn confirm(&mut self, invariants: &[Expr]) -> Result<Vec<Expr>, EngineError>;
}

/// One optional backend per engine, handed to the director at
/// construction. An engine enabled by settings without its backend is a
/// construction error.
#[derive(Default)]
pub struct Backends {
    /// For the bounded model checking engine
    pub bmc: Option<Box<dyn InductionBackend>>,
    /// For the k-induction engine
    pub k_induction: Option<Box<dyn InductionBackend>>,
    /// For the invariant generation engine
    pub invariant_generation: Option<Box<dyn InvariantBackend>>,
    /// For the smoothing engine
    pub smoothing: Option<Box<dyn SmoothingBackend>>,
    /// For the PDR engine
    pub pdr: Option<Box<dyn PdrBackend>>,
    /// For the advice engine
    pub advice: Option<Box<dyn AdviceBackend>>,
    /// For the core reduction engine
    pub ivc_reduction: Option<Box<dyn IvcBackend>>,
    /// For the core enumeration engine
    pub all_ivcs: Option<Box<dyn AllIvcsBackend>>,
}

impl Backends {
    /// No backends at all: only valid with every engine disabled.
    pub fn none() -> Self {
        Backends::default()
    }
}
