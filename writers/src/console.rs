// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Writer that prints verdicts as they arrive.

use std::collections::{BTreeMap, BTreeSet};

use lustre::syntax::Expr;
use results::{AllIvcs, Counterexample};

use crate::layout::NodeLayout;
use crate::{text, Writer};

/// Prints each verdict to stdout immediately, for interactive runs where
/// waiting for the final report is unhelpful.
pub struct ConsoleWriter {
    layout: NodeLayout,
}

impl ConsoleWriter {
    /// Create a writer rendering signals with the given layout.
    pub fn new(layout: NodeLayout) -> Self {
        ConsoleWriter { layout }
    }
}

impl Writer for ConsoleWriter {
    fn begin(&mut self) {}

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
    ) {
        print!(
            "{}",
            text::format_valid(
                properties,
                source,
                k,
                proof_time,
                runtime,
                invariants,
                ivc,
                all_ivcs,
                mivc_timed_out,
            )
        );
    }

    fn write_invalid(&mut self, property: &str, source: &str, cex: &Counterexample, runtime: f64) {
        print!(
            "{}",
            text::format_invalid(property, source, cex, runtime, &self.layout)
        );
    }

    fn write_unknown(
        &mut self,
        properties: &[String],
        base_step: usize,
        inductive_cexs: &BTreeMap<String, Counterexample>,
        runtime: f64,
    ) {
        print!(
            "{}",
            text::format_unknown(properties, base_step, inductive_cexs, runtime, &self.layout)
        );
    }

    fn write_base_step(&mut self, properties: &[String], k: usize, runtime: f64) {
        print!("{}", text::format_base_step(properties, k, runtime));
    }

    fn end(&mut self) {}
}
