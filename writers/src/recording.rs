// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Writer that records every call it receives.
//!
//! Embedding systems (and this workspace's own tests) use it to observe
//! exactly what the director reported and when, without parsing a rendered
//! document.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use lustre::syntax::Expr;
use results::{AllIvcs, Counterexample};

use crate::Writer;

/// One recorded call, with the arguments worth asserting on.
#[derive(Clone, Debug, PartialEq)]
pub enum WriterCall {
    /// `begin` was called
    Begin,
    /// A valid verdict
    Valid {
        /// Properties reported valid
        properties: Vec<String>,
        /// Reporting engine
        source: String,
        /// Proof depth
        k: usize,
        /// Elapsed runtime in seconds
        runtime: f64,
        /// Invariants reported alongside the verdict
        invariants: Vec<Expr>,
        /// Reported validity core
        ivc: BTreeSet<String>,
        /// Number of enumerated cores
        all_ivcs: usize,
        /// Whether core minimization timed out
        mivc_timed_out: bool,
    },
    /// An invalid verdict
    Invalid {
        /// The refuted property
        property: String,
        /// Reporting engine
        source: String,
        /// Counterexample length
        length: usize,
    },
    /// An unknown verdict
    Unknown {
        /// Properties given up on
        properties: Vec<String>,
        /// Depth bounded model checking had reached
        base_step: usize,
        /// Properties that had inductive counterexamples attached
        inductive_cex_properties: Vec<String>,
    },
    /// A base-step progress report
    BaseStep {
        /// Properties still unfalsified
        properties: Vec<String>,
        /// Cleared depth
        k: usize,
        /// Elapsed runtime in seconds
        runtime: f64,
    },
    /// `end` was called
    End,
}

/// Records calls behind a shared handle; clone the handle before handing
/// the writer off, then assert on [`RecordingWriter::calls`].
#[derive(Default)]
pub struct RecordingWriter {
    log: Arc<Mutex<Vec<WriterCall>>>,
}

impl RecordingWriter {
    /// A fresh writer with an empty log.
    pub fn new() -> Self {
        RecordingWriter::default()
    }

    /// Shared handle to the log.
    pub fn log(&self) -> Arc<Mutex<Vec<WriterCall>>> {
        Arc::clone(&self.log)
    }

    /// Snapshot of the calls recorded so far.
    pub fn calls(&self) -> Vec<WriterCall> {
        self.log.lock().unwrap().clone()
    }

    fn push(&self, call: WriterCall) {
        self.log.lock().unwrap().push(call);
    }
}

impl Writer for RecordingWriter {
    fn begin(&mut self) {
        self.push(WriterCall::Begin);
    }

    fn write_valid(
        &mut self,
        properties: &[String],
        source: &str,
        k: usize,
        _proof_time: f64,
        runtime: f64,
        invariants: &[Expr],
        ivc: &BTreeSet<String>,
        all_ivcs: &[AllIvcs],
        mivc_timed_out: bool,
    ) {
        self.push(WriterCall::Valid {
            properties: properties.to_vec(),
            source: source.to_string(),
            k,
            runtime,
            invariants: invariants.to_vec(),
            ivc: ivc.clone(),
            all_ivcs: all_ivcs.len(),
            mivc_timed_out,
        });
    }

    fn write_invalid(&mut self, property: &str, source: &str, cex: &Counterexample, _runtime: f64) {
        self.push(WriterCall::Invalid {
            property: property.to_string(),
            source: source.to_string(),
            length: cex.length,
        });
    }

    fn write_unknown(
        &mut self,
        properties: &[String],
        base_step: usize,
        inductive_cexs: &BTreeMap<String, Counterexample>,
        _runtime: f64,
    ) {
        self.push(WriterCall::Unknown {
            properties: properties.to_vec(),
            base_step,
            inductive_cex_properties: inductive_cexs.keys().cloned().collect(),
        });
    }

    fn write_base_step(&mut self, properties: &[String], k: usize, runtime: f64) {
        self.push(WriterCall::BaseStep {
            properties: properties.to_vec(),
            k,
            runtime,
        });
    }

    fn end(&mut self) {
        self.push(WriterCall::End);
    }
}
