// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Persisted hints reusable across runs.
//!
//! An advice file records the variable declarations it was produced
//! against and the invariants learned during the run. The encoding is
//! JSON; nothing outside this module depends on that.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lustre::syntax::{Expr, VarDecl};

/// A failure reading an advice file. Fatal at director construction.
#[derive(Error, Debug)]
pub enum AdviceError {
    /// The file could not be read
    #[error("could not read advice file: {0}")]
    Io(#[from] std::io::Error),
    /// The file was not valid advice
    #[error("malformed advice file: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Hints persisted by an earlier run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    /// Declarations of the node the hints were learned on
    pub var_decls: Vec<VarDecl>,
    /// The invariants worth retrying
    pub invariants: Vec<Expr>,
}

/// Decode an advice file.
pub fn read<P: AsRef<Path>>(path: P) -> Result<Advice, AdviceError> {
    let contents = fs::read_to_string(path)?;
    let advice = serde_json::from_str(&contents)?;
    Ok(advice)
}

/// Accumulates advice over a run and saves it once, from post-processing.
pub struct AdviceWriter {
    path: PathBuf,
    advice: Advice,
    seen: HashSet<Expr>,
}

impl AdviceWriter {
    /// An empty writer targeting `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        AdviceWriter {
            path: path.as_ref().to_path_buf(),
            advice: Advice::default(),
            seen: HashSet::new(),
        }
    }

    /// Record the declarations the hints are being learned against.
    pub fn add_var_decls(&mut self, var_decls: Vec<VarDecl>) {
        self.advice.var_decls.extend(var_decls);
    }

    /// Record learned invariants, keeping the first copy of each.
    pub fn add_invariants(&mut self, invariants: &[Expr]) {
        for inv in invariants {
            if self.seen.insert(inv.clone()) {
                self.advice.invariants.push(inv.clone());
            }
        }
    }

    /// Save the accumulated advice. A failed save costs the next run its
    /// hints, nothing more.
    pub fn write(&self) {
        let encoded = match serde_json::to_string_pretty(&self.advice) {
            Ok(s) => s,
            Err(err) => {
                log::warn!("could not encode advice: {err}");
                return;
            }
        };
        if let Err(err) = fs::write(&self.path, encoded) {
            log::warn!("could not save advice to {}: {err}", self.path.display());
        }
    }
}
