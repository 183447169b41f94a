// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The recognized option set.
//!
//! A host front end builds a `Settings` from whatever surface it exposes
//! (command line, build file, another tool embedding the analysis); the
//! director reads it and nothing else. The engine set is fixed by these
//! flags at construction and never changes during a run.

use std::path::PathBuf;

/// Everything configurable about a run.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Run the bounded model checking engine
    pub bounded_model_checking: bool,
    /// Run the k-induction engine
    pub k_induction: bool,
    /// Run the invariant generation engine
    pub invariant_generation: bool,
    /// Route counterexamples through the smoothing engine before reporting
    pub smooth_counterexamples: bool,
    /// Number of properties the PDR engine works on at once; 0 disables it
    pub pdr_max: usize,
    /// Load persisted hints from this file before starting
    pub read_advice: Option<PathBuf>,
    /// Persist hints to this file as the run learns them
    pub write_advice: Option<PathBuf>,
    /// Route valid verdicts through minimal-core reduction
    pub reduce_ivc: bool,
    /// Additionally enumerate every validity core
    pub all_ivcs: bool,
    /// Treat every core element as an assignment when projecting cores for
    /// reporting
    pub all_assigned: bool,
    /// Wall-clock budget in seconds; expiry turns unsettled properties
    /// into unknown verdicts
    pub timeout: u64,
    /// Largest depth the unrolling engines try
    pub max_depth: usize,
    /// Write a spreadsheet next to the input
    pub excel: bool,
    /// Write an XML document next to the input
    pub xml: bool,
    /// Stream the XML document to stdout as results arrive
    pub xml_to_stdout: bool,
    /// Print verdicts as they arrive instead of a final report
    pub console: bool,
    /// Base name (input file without extension) for the file writers
    pub filename: String,
    /// The run is hosted inside another analysis: keep quiet, keep results
    /// in memory, and stop engines explicitly when done
    pub embedded: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bounded_model_checking: true,
            k_induction: true,
            invariant_generation: true,
            smooth_counterexamples: false,
            pdr_max: 1,
            read_advice: None,
            write_advice: None,
            reduce_ivc: false,
            all_ivcs: false,
            all_assigned: true,
            timeout: u64::MAX,
            max_depth: 200,
            excel: false,
            xml: false,
            xml_to_stdout: false,
            console: false,
            filename: String::new(),
            embedded: false,
        }
    }
}
