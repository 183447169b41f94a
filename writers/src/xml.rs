// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! XML writer, optionally mirrored to stdout as elements are produced.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use itertools::Itertools;

use lustre::syntax::Expr;
use results::{AllIvcs, Counterexample, Signal};

use crate::Writer;

pub(crate) fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Buffers an XML results document and saves it when the run ends. With
/// `to_stdout` every element is also printed as it is produced, so a host
/// process can consume results incrementally.
pub struct XmlWriter {
    path: PathBuf,
    file: File,
    to_stdout: bool,
    buffer: String,
}

impl XmlWriter {
    /// Open the output file. Failing to open is fatal for the caller.
    pub fn new<P: AsRef<Path>>(path: P, to_stdout: bool) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(XmlWriter {
            path,
            file,
            to_stdout,
            buffer: String::new(),
        })
    }

    fn emit(&mut self, element: &str) {
        if self.to_stdout {
            print!("{element}");
        }
        self.buffer.push_str(element);
    }

    fn counterexample_xml(cex: &Counterexample) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "    <Counterexample length=\"{}\">", cex.length);
        for Signal { name, values } in &cex.signals {
            let _ = writeln!(out, "      <Signal name=\"{}\">", escape(name));
            for (step, value) in values.iter().enumerate() {
                if let Some(v) = value {
                    let _ = writeln!(out, "        <Value step=\"{step}\">{v}</Value>");
                }
            }
            let _ = writeln!(out, "      </Signal>");
        }
        let _ = writeln!(out, "    </Counterexample>");
        out
    }
}

impl Writer for XmlWriter {
    fn begin(&mut self) {
        self.emit("<?xml version=\"1.0\"?>\n<Results>\n");
    }

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
        for property in properties {
            let mut element = String::new();
            let _ = writeln!(element, "  <Property name=\"{}\">", escape(property));
            let _ = writeln!(element, "    <Runtime unit=\"sec\">{runtime:.3}</Runtime>");
            if proof_time >= 0.0 {
                let _ = writeln!(element, "    <ProofTime unit=\"sec\">{proof_time:.3}</ProofTime>");
            }
            let _ = writeln!(element, "    <K>{k}</K>");
            let _ = writeln!(element, "    <Answer source=\"{}\">valid</Answer>", escape(source));
            for inv in invariants {
                let _ = writeln!(element, "    <Invariant>{}</Invariant>", escape(&inv.to_string()));
            }
            if !ivc.is_empty() {
                let _ = writeln!(
                    element,
                    "    <Ivc timedOut=\"{mivc_timed_out}\">{}</Ivc>",
                    escape(&ivc.iter().join(", "))
                );
            }
            for core in all_ivcs {
                let _ = writeln!(
                    element,
                    "    <AllIvc>{}</AllIvc>",
                    escape(&core.set.iter().join(", "))
                );
            }
            let _ = writeln!(element, "  </Property>");
            self.emit(&element);
        }
    }

    fn write_invalid(&mut self, property: &str, source: &str, cex: &Counterexample, runtime: f64) {
        let mut element = String::new();
        let _ = writeln!(element, "  <Property name=\"{}\">", escape(property));
        let _ = writeln!(element, "    <Runtime unit=\"sec\">{runtime:.3}</Runtime>");
        let _ = writeln!(element, "    <K>{}</K>", cex.length);
        let _ = writeln!(element, "    <Answer source=\"{}\">falsifiable</Answer>", escape(source));
        element.push_str(&Self::counterexample_xml(cex));
        let _ = writeln!(element, "  </Property>");
        self.emit(&element);
    }

    fn write_unknown(
        &mut self,
        properties: &[String],
        base_step: usize,
        inductive_cexs: &BTreeMap<String, Counterexample>,
        runtime: f64,
    ) {
        for property in properties {
            let mut element = String::new();
            let _ = writeln!(element, "  <Property name=\"{}\">", escape(property));
            let _ = writeln!(element, "    <Runtime unit=\"sec\">{runtime:.3}</Runtime>");
            let _ = writeln!(element, "    <TrueFor>{base_step}</TrueFor>");
            let _ = writeln!(element, "    <Answer>unknown</Answer>");
            if let Some(cex) = inductive_cexs.get(property) {
                element.push_str(&Self::counterexample_xml(cex));
            }
            let _ = writeln!(element, "  </Property>");
            self.emit(&element);
        }
    }

    fn write_base_step(&mut self, properties: &[String], k: usize, runtime: f64) {
        for property in properties {
            let element = format!(
                "  <Progress source=\"bmc\" trueFor=\"{k}\" runtime=\"{runtime:.3}\">{}</Progress>\n",
                escape(property)
            );
            self.emit(&element);
        }
    }

    fn end(&mut self) {
        self.emit("</Results>\n");
        if let Err(err) = self.file.write_all(self.buffer.as_bytes()) {
            log::warn!("could not save {}: {err}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_document_shape() {
        let path = std::env::temp_dir().join(format!("xml_writer_test_{}.xml", std::process::id()));
        let mut w = XmlWriter::new(&path, false).unwrap();
        w.begin();
        w.write_valid(
            &["a < b".to_string()],
            "pdr",
            2,
            -1.0,
            0.5,
            &[],
            &BTreeSet::new(),
            &[],
            false,
        );
        w.write_unknown(&["p2".to_string()], 7, &BTreeMap::new(), 0.75);
        w.end();

        let doc = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();
        assert!(doc.starts_with("<?xml version=\"1.0\"?>\n<Results>"));
        assert!(doc.contains("<Property name=\"a &lt; b\">"));
        assert!(doc.contains("<Answer source=\"pdr\">valid</Answer>"));
        assert!(!doc.contains("ProofTime"));
        assert!(doc.contains("<TrueFor>7</TrueFor>"));
        assert!(doc.trim_end().ends_with("</Results>"));
    }
}
