// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Process exit codes the director reports.

/// Clean run. A timeout alone is still a clean run; it produces unknown
/// verdicts, not a failure.
pub const SUCCESS: i32 = 0;

/// An engine died with a fatal error.
pub const UNCAUGHT_EXCEPTION: i32 = 2;

/// An engine died inside validity-core extraction.
pub const IVC_EXCEPTION: i32 = 3;
