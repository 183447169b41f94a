// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! End-to-end runs of the director with scripted backends standing in for
//! the solvers.

use std::collections::BTreeSet;

use engines::backends::{
    Backends, CheckOutcome, InductionBackend, IvcBackend, IvcOutcome,
};
use engines::{exit_codes, Director, EngineError, Settings};
use lustre::semantics::{Model, Value};
use lustre::syntax::{BinaryOp, Equation, Expr, Node, Specification, Type, VarDecl};
use writers::{RecordingWriter, WriterCall};

fn spec(properties: &[&str]) -> Specification {
    Specification::new(Node {
        name: "main".to_string(),
        inputs: vec![VarDecl::new("x", Type::Int)],
        outputs: properties.iter().map(|p| VarDecl::new(p, Type::Bool)).collect(),
        locals: vec![VarDecl::new("a", Type::Bool)],
        equations: vec![Equation::new(
            "a",
            Expr::binary(BinaryOp::GreaterEqual, Expr::id("x"), Expr::Int(0)),
        )],
        properties: properties.iter().map(|p| p.to_string()).collect(),
        ivc: vec!["a".to_string()],
    })
}

fn violation_model() -> Model {
    let mut model = Model::new();
    model.set("x", 0, Value::Int(1));
    model.set("x", 1, Value::Int(-1));
    model
}

/// Refutes "bad" at depth 1, clears everything else.
struct ScriptedBmc;

impl InductionBackend for ScriptedBmc {
    fn base_case(
        &mut self,
        k: usize,
        properties: &[String],
        _invariants: &[Expr],
    ) -> Result<CheckOutcome, EngineError> {
        if k == 1 && properties.iter().any(|p| p == "bad") {
            return Ok(CheckOutcome::Violation {
                properties: vec!["bad".to_string()],
                model: violation_model(),
            });
        }
        Ok(CheckOutcome::Clear {
            ivc: BTreeSet::new(),
        })
    }

    fn inductive_step(
        &mut self,
        _k: usize,
        _properties: &[String],
        _invariants: &[Expr],
    ) -> Result<CheckOutcome, EngineError> {
        Ok(CheckOutcome::Unknown)
    }
}

/// Finds a step counterexample at depth 1, closes the proof at depth 2.
struct ScriptedKInduction;

impl InductionBackend for ScriptedKInduction {
    fn base_case(
        &mut self,
        _k: usize,
        _properties: &[String],
        _invariants: &[Expr],
    ) -> Result<CheckOutcome, EngineError> {
        Ok(CheckOutcome::Unknown)
    }

    fn inductive_step(
        &mut self,
        k: usize,
        properties: &[String],
        _invariants: &[Expr],
    ) -> Result<CheckOutcome, EngineError> {
        if k < 2 {
            return Ok(CheckOutcome::Violation {
                properties: properties.to_vec(),
                model: violation_model(),
            });
        }
        Ok(CheckOutcome::Clear {
            ivc: ["a".to_string()].into_iter().collect(),
        })
    }
}

struct FailingBackend(EngineError);

impl InductionBackend for FailingBackend {
    fn base_case(
        &mut self,
        _k: usize,
        _properties: &[String],
        _invariants: &[Expr],
    ) -> Result<CheckOutcome, EngineError> {
        Err(self.0.clone())
    }

    fn inductive_step(
        &mut self,
        _k: usize,
        _properties: &[String],
        _invariants: &[Expr],
    ) -> Result<CheckOutcome, EngineError> {
        Err(self.0.clone())
    }
}

/// Shrinks whatever core it is given to its first element.
struct ScriptedIvc;

impl IvcBackend for ScriptedIvc {
    fn reduce(
        &mut self,
        _property: &str,
        _k: usize,
        _invariants: &[Expr],
        ivc: &BTreeSet<String>,
    ) -> Result<IvcOutcome, EngineError> {
        Ok(IvcOutcome {
            core: ivc.iter().take(1).cloned().collect(),
            timed_out: false,
        })
    }
}

#[test]
fn test_refutation_and_proof_settle_the_roster() {
    let settings = Settings {
        invariant_generation: false,
        pdr_max: 0,
        max_depth: 10,
        ..Settings::default()
    };
    let writer = RecordingWriter::new();
    let log = writer.log();
    let s = spec(&["ok", "bad"]);
    let mut director = Director::with_writer(
        settings,
        s.clone(),
        s,
        Backends {
            bmc: Some(Box::new(ScriptedBmc)),
            k_induction: Some(Box::new(ScriptedKInduction)),
            ..Backends::none()
        },
        Box::new(writer),
    )
    .unwrap();

    let exit_code = director.run();

    assert_eq!(exit_code, exit_codes::SUCCESS);
    assert_eq!(director.valid_properties(), &["ok".to_string()]);
    assert_eq!(director.invalid_properties(), &["bad".to_string()]);
    assert!(director.remaining_properties().is_empty());

    let calls = log.lock().unwrap();
    assert_eq!(calls.first(), Some(&WriterCall::Begin));
    assert_eq!(calls.last(), Some(&WriterCall::End));
    let invalids: Vec<_> = calls
        .iter()
        .filter(|c| matches!(c, WriterCall::Invalid { .. }))
        .collect();
    match &invalids[..] {
        [WriterCall::Invalid { property, length, source }] => {
            assert_eq!(property, "bad");
            assert_eq!(*length, 2);
            assert_eq!(source, "bmc");
        }
        other => panic!("expected one invalid write, got {other:?}"),
    }
    let valids: Vec<_> = calls
        .iter()
        .filter(|c| matches!(c, WriterCall::Valid { .. }))
        .collect();
    match &valids[..] {
        [WriterCall::Valid { properties, k, source, .. }] => {
            assert_eq!(properties, &vec!["ok".to_string()]);
            assert_eq!(*k, 2);
            assert_eq!(source, "k-induction");
        }
        other => panic!("expected one valid write, got {other:?}"),
    }
}

#[test]
fn test_valid_verdicts_route_through_core_reduction() {
    let settings = Settings {
        bounded_model_checking: false,
        invariant_generation: false,
        pdr_max: 0,
        reduce_ivc: true,
        max_depth: 10,
        ..Settings::default()
    };
    let writer = RecordingWriter::new();
    let log = writer.log();
    let s = spec(&["ok"]);
    let mut director = Director::with_writer(
        settings,
        s.clone(),
        s,
        Backends {
            k_induction: Some(Box::new(ScriptedKInduction)),
            ivc_reduction: Some(Box::new(ScriptedIvc)),
            ..Backends::none()
        },
        Box::new(writer),
    )
    .unwrap();

    let exit_code = director.run();

    assert_eq!(exit_code, exit_codes::SUCCESS);
    assert_eq!(director.valid_properties(), &["ok".to_string()]);

    let calls = log.lock().unwrap();
    let valids: Vec<_> = calls
        .iter()
        .filter(|c| matches!(c, WriterCall::Valid { .. }))
        .collect();
    match &valids[..] {
        [WriterCall::Valid { properties, ivc, .. }] => {
            assert_eq!(properties, &vec!["ok".to_string()]);
            // the reduced core {a} is reported through its defining
            // equation's right-hand side
            let expected: BTreeSet<String> = ["x".to_string()].into_iter().collect();
            assert_eq!(ivc, &expected);
        }
        other => panic!("expected one valid write, got {other:?}"),
    }
}

#[test]
fn test_engine_failure_exit_code() {
    let settings = Settings {
        k_induction: false,
        invariant_generation: false,
        pdr_max: 0,
        max_depth: 10,
        ..Settings::default()
    };
    let writer = RecordingWriter::new();
    let s = spec(&["ok"]);
    let mut director = Director::with_writer(
        settings,
        s.clone(),
        s,
        Backends {
            bmc: Some(Box::new(FailingBackend(EngineError::Solver(
                "solver exited".to_string(),
            )))),
            ..Backends::none()
        },
        Box::new(writer),
    )
    .unwrap();

    assert_eq!(director.run(), exit_codes::UNCAUGHT_EXCEPTION);
}

#[test]
fn test_core_failure_exit_code() {
    let settings = Settings {
        bounded_model_checking: false,
        invariant_generation: false,
        pdr_max: 0,
        max_depth: 10,
        ..Settings::default()
    };
    let writer = RecordingWriter::new();
    let s = spec(&["ok"]);
    let mut director = Director::with_writer(
        settings,
        s.clone(),
        s,
        Backends {
            k_induction: Some(Box::new(FailingBackend(EngineError::Ivc(
                "minimization failed".to_string(),
            )))),
            ..Backends::none()
        },
        Box::new(writer),
    )
    .unwrap();

    assert_eq!(director.run(), exit_codes::IVC_EXCEPTION);
}
