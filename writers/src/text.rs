// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Shared plain-text rendering for the console and in-memory writers.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use itertools::Itertools;

use lustre::syntax::Expr;
use results::{AllIvcs, Counterexample};

use crate::layout::NodeLayout;

pub(crate) fn format_valid(
    properties: &[String],
    source: &str,
    k: usize,
    proof_time: f64,
    runtime: f64,
    invariants: &[Expr],
    ivc: &BTreeSet<String>,
    all_ivcs: &[AllIvcs],
    mivc_timed_out: bool,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "VALID PROPERTIES: [{}] || K = {k} || Time = {runtime:.3}s || Source = {source}",
        properties.iter().join(", ")
    );
    if proof_time >= 0.0 {
        let _ = writeln!(out, "  proof time: {proof_time:.3}s");
    }
    if !invariants.is_empty() {
        let _ = writeln!(out, "  invariants:");
        for inv in invariants {
            let _ = writeln!(out, "    {inv}");
        }
    }
    if !ivc.is_empty() {
        let _ = writeln!(
            out,
            "  inductive validity core: [{}]{}",
            ivc.iter().join(", "),
            if mivc_timed_out {
                " (minimization timed out)"
            } else {
                ""
            }
        );
    }
    for (i, core) in all_ivcs.iter().enumerate() {
        let _ = writeln!(out, "  core {}: [{}]", i + 1, core.set.iter().join(", "));
    }
    out
}

pub(crate) fn format_invalid(
    property: &str,
    source: &str,
    cex: &Counterexample,
    runtime: f64,
    layout: &NodeLayout,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "INVALID PROPERTY: [{property}] || K = {} || Time = {runtime:.3}s || Source = {source}",
        cex.length
    );
    out.push_str(&format_counterexample(cex, layout));
    out
}

pub(crate) fn format_unknown(
    properties: &[String],
    base_step: usize,
    inductive_cexs: &BTreeMap<String, Counterexample>,
    runtime: f64,
    layout: &NodeLayout,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "UNKNOWN PROPERTIES: [{}] || True for {base_step} steps || Time = {runtime:.3}s",
        properties.iter().join(", ")
    );
    for prop in properties {
        if let Some(cex) = inductive_cexs.get(prop) {
            let _ = writeln!(out, "  inductive counterexample for {prop}:");
            out.push_str(&format_counterexample(cex, layout));
        }
    }
    out
}

pub(crate) fn format_base_step(properties: &[String], k: usize, runtime: f64) -> String {
    format!(
        "PROPERTIES TRUE THROUGH STEP {k}: [{}] || Time = {runtime:.3}s\n",
        properties.iter().join(", ")
    )
}

fn format_counterexample(cex: &Counterexample, layout: &NodeLayout) -> String {
    let mut out = String::new();

    let name_width = cex
        .signals
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0)
        .max("Step".len());
    let cell = |v: &Option<lustre::semantics::Value>| match v {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    };
    let value_width = cex
        .signals
        .iter()
        .flat_map(|s| s.values.iter().map(|v| cell(v).len()))
        .max()
        .unwrap_or(1);

    let _ = write!(out, "    {:name_width$}", "Step");
    for step in 0..cex.length {
        let _ = write!(out, "  {step:>value_width$}");
    }
    out.push('\n');

    for (label, names) in layout.sections() {
        let signals: Vec<_> = names.iter().filter_map(|n| cex.signal(n)).collect();
        if signals.is_empty() {
            continue;
        }
        let _ = writeln!(out, "    {label}");
        for signal in signals {
            let _ = write!(out, "    {:name_width$}", signal.name);
            for v in &signal.values {
                let _ = write!(out, "  {:>value_width$}", cell(v));
            }
            out.push('\n');
        }
    }
    out
}
