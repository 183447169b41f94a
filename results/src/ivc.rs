// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Inductive validity cores: the minimal equation sets sufficient to prove
//! a property, and the projection from internal core elements back to the
//! streams a user recognizes.

use std::collections::BTreeSet;

use lustre::syntax::Equation;

/// One enumerated validity core, as produced by the all-cores engine.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct AllIvcs {
    /// The core, as a set of element names
    pub set: BTreeSet<String>,
    /// The order the elements were discovered in
    pub list: Vec<String>,
}

impl AllIvcs {
    /// Build a core from element names, preserving discovery order.
    pub fn new<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list: Vec<String> = elements
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        AllIvcs {
            set: list.iter().cloned().collect(),
            list,
        }
    }
}

/// Project core elements onto the right-hand sides of their defining
/// equations.
///
/// Core elements name defined streams; the user thinks in terms of the
/// streams those definitions read. Each element with a defining equation
/// contributes that equation's support. An element with no defining
/// equation (an input, or a name introduced by translation) survives only
/// under `all_assigned`, where every name is known to stand for an
/// assignment.
pub fn right_side(
    ivc: &BTreeSet<String>,
    all_assigned: bool,
    equations: &[Equation],
) -> BTreeSet<String> {
    let mut result = BTreeSet::new();
    for name in ivc {
        match equations.iter().find(|eq| &eq.lhs == name) {
            Some(eq) => result.extend(eq.rhs.support()),
            None => {
                if all_assigned {
                    result.insert(name.clone());
                }
            }
        }
    }
    result
}
