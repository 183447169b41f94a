// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Counterexample traces and the two pure functions that build them from
//! solver models.

use lustre::semantics::{Model, Value};
use lustre::syntax::Specification;

/// One stream of a counterexample over `0..length` steps. Steps the solver
/// left unconstrained (and reconstruction did not fill) are `None`.
#[derive(PartialEq, Clone, Debug)]
pub struct Signal {
    /// Stream name
    pub name: String,
    /// One entry per step
    pub values: Vec<Option<Value>>,
}

/// A finite trace refuting a property (or, for inductive counterexamples,
/// refuting only the inductive step).
#[derive(PartialEq, Clone, Debug)]
pub struct Counterexample {
    /// Number of steps in the trace
    pub length: usize,
    /// One signal per declared variable of the user node, in declaration
    /// order
    pub signals: Vec<Signal>,
}

impl Counterexample {
    /// The signal for `name`, if the trace contains it.
    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }
}

/// Complete a partial solver model for presentation.
///
/// The analysis form introduces streams the user never wrote and the solver
/// assigns only the variables its query mentioned. In `concrete` mode every
/// stream declared by either form receives its type's default value at every
/// step the solver skipped, so the extracted trace has no holes. Outside
/// concrete mode (inductive counterexamples) the gaps are kept, since an
/// arbitrary filler would suggest a reachable state that was never claimed.
pub fn reconstruct_model(
    user_spec: &Specification,
    analysis_spec: &Specification,
    model: &Model,
    _property: &str,
    k: usize,
    concrete: bool,
) -> Model {
    let mut result = model.clone();
    if !concrete {
        return result;
    }
    for vd in user_spec
        .node
        .var_decls()
        .into_iter()
        .chain(analysis_spec.node.var_decls())
    {
        for step in 0..k {
            if result.value(&vd.name, step).is_none() {
                result.set(&vd.name, step, Value::default_for(vd.typ));
            }
        }
    }
    result
}

/// Project a model onto the user node's declared variables over `k` steps.
pub fn extract_counterexample(user_spec: &Specification, k: usize, model: &Model) -> Counterexample {
    let signals = user_spec
        .node
        .var_decls()
        .into_iter()
        .map(|vd| Signal {
            values: (0..k).map(|step| model.value(&vd.name, step)).collect(),
            name: vd.name,
        })
        .collect();
    Counterexample {
        length: k,
        signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lustre::syntax::{Equation, Expr, Node, Type, VarDecl};

    fn spec() -> Specification {
        Specification::new(Node {
            name: "main".to_string(),
            inputs: vec![VarDecl::new("x", Type::Int)],
            outputs: vec![VarDecl::new("ok", Type::Bool)],
            locals: vec![],
            equations: vec![Equation::new("ok", Expr::id("x"))],
            properties: vec!["ok".to_string()],
            ivc: vec![],
        })
    }

    #[test]
    fn test_extract_follows_declaration_order() {
        let mut model = Model::new();
        model.set("x", 0, Value::Int(1));
        model.set("x", 1, Value::Int(2));
        model.set("ok", 1, Value::Bool(false));

        let cex = extract_counterexample(&spec(), 2, &model);
        assert_eq!(cex.length, 2);
        let names: Vec<_> = cex.signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["x", "ok"]);
        assert_eq!(
            cex.signal("x").unwrap().values,
            vec![Some(Value::Int(1)), Some(Value::Int(2))]
        );
        assert_eq!(
            cex.signal("ok").unwrap().values,
            vec![None, Some(Value::Bool(false))]
        );
    }

    #[test]
    fn test_reconstruct_concrete_fills_gaps() {
        let mut model = Model::new();
        model.set("ok", 1, Value::Bool(false));

        let user = spec();
        let filled = reconstruct_model(&user, &user, &model, "ok", 2, true);
        assert_eq!(filled.value("x", 0), Some(Value::Int(0)));
        assert_eq!(filled.value("x", 1), Some(Value::Int(0)));
        assert_eq!(filled.value("ok", 0), Some(Value::Bool(false)));
        // solver-assigned values are never overwritten
        assert_eq!(filled.value("ok", 1), Some(Value::Bool(false)));

        let partial = reconstruct_model(&user, &user, &model, "ok", 2, false);
        assert_eq!(partial.value("x", 0), None);
    }
}
