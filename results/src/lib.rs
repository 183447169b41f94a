// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Result artifacts the engines produce: counterexample traces and
//! inductive validity cores, plus the pure functions that turn raw solver
//! models into user-facing traces.

// configure clippy
#![allow(clippy::needless_return)]
#![deny(clippy::uninlined_format_args)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod counterexample;
pub mod ivc;

pub use counterexample::{extract_counterexample, reconstruct_model, Counterexample, Signal};
pub use ivc::{right_side, AllIvcs};
