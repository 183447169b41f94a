// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Grouping of a node's signals into presentation sections.

use lustre::syntax::Node;

/// Orders a node's signals into the sections the textual writers print.
#[derive(Clone, Debug)]
pub struct NodeLayout {
    sections: Vec<(String, Vec<String>)>,
}

impl NodeLayout {
    /// Build the Inputs/Outputs/Locals layout of a node. Empty sections are
    /// dropped.
    pub fn new(node: &Node) -> Self {
        let section = |label: &str, decls: &[lustre::syntax::VarDecl]| {
            (
                label.to_string(),
                decls.iter().map(|vd| vd.name.clone()).collect::<Vec<_>>(),
            )
        };
        let sections = [
            section("Inputs", &node.inputs),
            section("Outputs", &node.outputs),
            section("Locals", &node.locals),
        ]
        .into_iter()
        .filter(|(_, names)| !names.is_empty())
        .collect();
        NodeLayout { sections }
    }

    /// The sections in presentation order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.sections
            .iter()
            .map(|(label, names)| (label.as_str(), names.as_slice()))
    }
}
