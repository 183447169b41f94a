// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Types of a translated synchronous dataflow program.
//!
//! Parsing and translation happen upstream; this crate only defines the
//! analysis-ready form the proof engines and the director operate on, plus
//! the runtime values and solver models that flow back out of them.

// configure clippy
#![allow(clippy::needless_return)]
#![allow(clippy::large_enum_variant)]
#![deny(clippy::uninlined_format_args)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod semantics;
pub mod syntax;
