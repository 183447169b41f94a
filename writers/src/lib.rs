// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Output sinks for analysis verdicts.
//!
//! The director reports every settled property through the [`Writer`]
//! contract and stays ignorant of the concrete format. Writers that target
//! a file open it at construction (the only point a writer may fail) and
//! buffer their document in memory until [`Writer::end`].

// configure clippy
#![allow(clippy::needless_return)]
#![allow(clippy::too_many_arguments)]
#![deny(clippy::uninlined_format_args)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::{BTreeMap, BTreeSet};

use lustre::syntax::Expr;
use results::{AllIvcs, Counterexample};

pub mod console;
pub mod excel;
pub mod layout;
pub mod recording;
pub mod string;
mod text;
pub mod xml;

pub use console::ConsoleWriter;
pub use excel::ExcelWriter;
pub use layout::NodeLayout;
pub use recording::{RecordingWriter, WriterCall};
pub use string::StringWriter;
pub use xml::XmlWriter;

/// An output sink for verdicts.
///
/// `begin` is called exactly once before any write and `end` exactly once
/// after the last one. Every write carries the elapsed runtime in seconds,
/// which never decreases over a run. Writes do not fail; file-backed
/// writers buffer and flush in `end`.
pub trait Writer: Send {
    /// Start the document.
    fn begin(&mut self);

    /// Report properties proven valid at depth `k`.
    fn write_valid(
        &mut self,
        properties: &[String],
        source: &str,
        k: usize,
        proof_time: f64,
        runtime: f64,
        invariants: &[Expr],
        ivc: &BTreeSet<String>,
        all_ivcs: &[AllIvcs],
        mivc_timed_out: bool,
    );

    /// Report a refuted property with its counterexample.
    fn write_invalid(&mut self, property: &str, source: &str, cex: &Counterexample, runtime: f64);

    /// Report properties every configured engine has abandoned, with any
    /// inductive counterexamples gathered along the way.
    fn write_unknown(
        &mut self,
        properties: &[String],
        base_step: usize,
        inductive_cexs: &BTreeMap<String, Counterexample>,
        runtime: f64,
    );

    /// Report that bounded model checking cleared depth `k` for the named
    /// properties.
    fn write_base_step(&mut self, properties: &[String], k: usize, runtime: f64);

    /// Finish the document.
    fn end(&mut self);

    /// Buffered human-readable content, printed by the director after its
    /// run. Writers that already delivered their output return the empty
    /// string.
    fn rendered(&self) -> String {
        String::new()
    }
}
