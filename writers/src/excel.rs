// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Spreadsheet writer producing a SpreadsheetML workbook.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use itertools::Itertools;

use lustre::syntax::Expr;
use results::{AllIvcs, Counterexample};

use crate::xml::escape;
use crate::Writer;

/// Buffers a one-worksheet workbook (Excel 2003 XML dialect) and saves it
/// when the run ends.
pub struct ExcelWriter {
    path: PathBuf,
    file: File,
    buffer: String,
}

impl ExcelWriter {
    /// Open the output file. Failing to open is fatal for the caller.
    pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(ExcelWriter {
            path,
            file,
            buffer: String::new(),
        })
    }

    fn row(&mut self, cells: &[String]) {
        self.buffer.push_str("   <Row>\n");
        for cell in cells {
            let _ = writeln!(
                self.buffer,
                "    <Cell><Data ss:Type=\"String\">{}</Data></Cell>",
                escape(cell)
            );
        }
        self.buffer.push_str("   </Row>\n");
    }
}

impl Writer for ExcelWriter {
    fn begin(&mut self) {
        self.buffer.push_str(
            "<?xml version=\"1.0\"?>\n\
             <Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\"\n\
              xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\">\n\
              <Worksheet ss:Name=\"Results\">\n  <Table>\n",
        );
        self.row(&[
            "Property".to_string(),
            "Answer".to_string(),
            "K".to_string(),
            "Runtime (s)".to_string(),
            "Source".to_string(),
            "Notes".to_string(),
        ]);
    }

    fn write_valid(
        &mut self,
        properties: &[String],
        source: &str,
        k: usize,
        _proof_time: f64,
        runtime: f64,
        _invariants: &[Expr],
        ivc: &BTreeSet<String>,
        _all_ivcs: &[AllIvcs],
        mivc_timed_out: bool,
    ) {
        let mut notes = ivc.iter().join(", ");
        if mivc_timed_out {
            notes.push_str(" (minimization timed out)");
        }
        for property in properties {
            self.row(&[
                property.clone(),
                "valid".to_string(),
                k.to_string(),
                format!("{runtime:.3}"),
                source.to_string(),
                notes.clone(),
            ]);
        }
    }

    fn write_invalid(&mut self, property: &str, source: &str, cex: &Counterexample, runtime: f64) {
        self.row(&[
            property.to_string(),
            "falsifiable".to_string(),
            cex.length.to_string(),
            format!("{runtime:.3}"),
            source.to_string(),
            String::new(),
        ]);
    }

    fn write_unknown(
        &mut self,
        properties: &[String],
        base_step: usize,
        _inductive_cexs: &BTreeMap<String, Counterexample>,
        runtime: f64,
    ) {
        for property in properties {
            self.row(&[
                property.clone(),
                "unknown".to_string(),
                String::new(),
                format!("{runtime:.3}"),
                String::new(),
                format!("true for {base_step} steps"),
            ]);
        }
    }

    fn write_base_step(&mut self, _properties: &[String], _k: usize, _runtime: f64) {
        // progress is not part of the spreadsheet
    }

    fn end(&mut self) {
        self.buffer
            .push_str("  </Table>\n </Worksheet>\n</Workbook>\n");
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
    fn test_workbook_rows() {
        let path = std::env::temp_dir().join(format!("excel_writer_test_{}.xls", std::process::id()));
        let mut w = ExcelWriter::new(&path).unwrap();
        w.begin();
        w.write_valid(
            &["p1".to_string()],
            "bmc",
            1,
            -1.0,
            0.1,
            &[],
            &BTreeSet::new(),
            &[],
            false,
        );
        w.end();

        let doc = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();
        assert!(doc.contains("<Worksheet ss:Name=\"Results\">"));
        assert!(doc.contains("<Data ss:Type=\"String\">p1</Data>"));
        assert!(doc.trim_end().ends_with("</Workbook>"));
    }
}
