// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The director: lifecycle, roster, arbitration, fan-out, termination,
//! and the final report.
//!
//! The director owns all roster state and mutates it only on its own
//! supervision thread; engines never see that state directly. Engines
//! publish into the director's mailbox, and the supervision loop
//! re-broadcasts every drained message to its own handler and to every
//! engine, making the director the single publisher each engine observes.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use itertools::Itertools;
use thiserror::Error;

use lustre::semantics::Model;
use lustre::syntax::{Expr, Specification};
use results::{extract_counterexample, reconstruct_model, right_side, AllIvcs, Counterexample};
use writers::{ConsoleWriter, ExcelWriter, NodeLayout, StringWriter, Writer, XmlWriter};

use crate::advice::{self, Advice, AdviceError, AdviceWriter};
use crate::advice_engine::AdviceEngine;
use crate::all_ivcs::AllIvcsEngine;
use crate::backends::Backends;
use crate::bmc::BmcEngine;
use crate::engine::{self, Context, Engine, EngineError, EngineHandle};
use crate::exit_codes;
use crate::invariant_gen::InvariantGenerationEngine;
use crate::ivc_reduction::IvcReductionEngine;
use crate::kinduction::KInductionEngine;
use crate::messages::{
    BaseStepMessage, EngineType, InductiveCounterexampleMessage, InvalidMessage, Message,
    MessageHandler, UnknownMessage, ValidMessage,
};
use crate::pdr::PdrEngine;
use crate::settings::Settings;
use crate::shutdown::{self, ShutdownCoordinator};
use crate::smoothing::SmoothingEngine;
use crate::{bmc, kinduction, pdr};

/// The director's own message source tag.
pub const NAME: &str = "director";

/// A failure constructing the director.
#[derive(Error, Debug)]
pub enum DirectorError {
    /// The output file could not be opened
    #[error("unable to open output file: {0}")]
    WriterOpen(#[from] std::io::Error),
    /// The advice file could not be read
    #[error(transparent)]
    Advice(#[from] AdviceError),
    /// An engine is enabled without the backend that drives it
    #[error("{0} engine is enabled but no backend was supplied")]
    MissingBackend(&'static str),
}

/// Supervises the engines and arbitrates their findings into verdicts.
pub struct Director {
    settings: Arc<Settings>,
    user_spec: Arc<Specification>,
    analysis_spec: Arc<Specification>,
    writer: Box<dyn Writer>,
    start_time: Instant,

    remaining: Vec<String>,
    valid: Vec<String>,
    invalid: Vec<String>,
    base_step: usize,
    inductive_cexs: HashMap<String, InductiveCounterexampleMessage>,

    bmc_unknowns: HashMap<String, usize>,
    k_induction_unknowns: HashSet<String>,
    pdr_unknowns: HashSet<String>,

    input_advice: Option<Advice>,
    advice_writer: Option<AdviceWriter>,

    engines: Vec<Box<dyn Engine>>,
    handles: Vec<EngineHandle>,
    incoming: Receiver<Message>,

    output: String,
}

impl Director {
    /// Construct with the writer the settings select.
    pub fn new(
        settings: Settings,
        user_spec: Specification,
        analysis_spec: Specification,
        backends: Backends,
    ) -> Result<Self, DirectorError> {
        let writer = Self::open_writer(&settings, &user_spec)?;
        Self::with_writer(settings, user_spec, analysis_spec, backends, writer)
    }

    /// Construct with an explicit writer; the injection point for
    /// embedding hosts and tests.
    pub fn with_writer(
        settings: Settings,
        user_spec: Specification,
        analysis_spec: Specification,
        backends: Backends,
        writer: Box<dyn Writer>,
    ) -> Result<Self, DirectorError> {
        let settings = Arc::new(settings);
        let user_spec = Arc::new(user_spec);
        let analysis_spec = Arc::new(analysis_spec);

        let input_advice = match &settings.read_advice {
            Some(path) => Some(advice::read(path)?),
            None => None,
        };
        let advice_writer = settings.write_advice.as_ref().map(|path| {
            let mut aw = AdviceWriter::new(path);
            aw.add_var_decls(analysis_spec.node.var_decls());
            aw
        });

        let properties = analysis_spec.node.properties.clone();
        let (to_director, incoming) = mpsc::channel();
        let engines = Self::create_engines(
            &settings,
            &analysis_spec,
            &to_director,
            backends,
            &input_advice,
        )?;

        let mut director = Director {
            remaining: properties.clone(),
            valid: Vec::new(),
            invalid: Vec::new(),
            base_step: 0,
            inductive_cexs: HashMap::new(),
            bmc_unknowns: HashMap::new(),
            k_induction_unknowns: HashSet::new(),
            pdr_unknowns: HashSet::new(),
            input_advice,
            advice_writer,
            engines,
            handles: Vec::new(),
            incoming,
            output: String::new(),
            start_time: Instant::now(),
            settings,
            user_spec,
            analysis_spec,
            writer,
        };
        director.initialize_unknowns(&properties);
        Ok(director)
    }

    fn open_writer(
        settings: &Settings,
        user_spec: &Specification,
    ) -> Result<Box<dyn Writer>, DirectorError> {
        let layout = NodeLayout::new(&user_spec.node);
        if settings.excel {
            let path = format!("{}.xls", settings.filename);
            Ok(Box::new(ExcelWriter::new(path)?))
        } else if settings.xml {
            let path = format!("{}.xml", settings.filename);
            Ok(Box::new(XmlWriter::new(path, settings.xml_to_stdout)?))
        } else if settings.console {
            Ok(Box::new(ConsoleWriter::new(layout)))
        } else {
            Ok(Box::new(StringWriter::new(layout)))
        }
    }

    fn create_engines(
        settings: &Arc<Settings>,
        analysis_spec: &Arc<Specification>,
        to_director: &Sender<Message>,
        mut backends: Backends,
        input_advice: &Option<Advice>,
    ) -> Result<Vec<Box<dyn Engine>>, DirectorError> {
        let ctx = || {
            Context::new(
                Arc::clone(analysis_spec),
                Arc::clone(settings),
                to_director.clone(),
            )
        };
        let mut engines: Vec<Box<dyn Engine>> = Vec::new();

        if settings.bounded_model_checking {
            let backend = backends
                .bmc
                .take()
                .ok_or(DirectorError::MissingBackend(bmc::NAME))?;
            engines.push(Box::new(BmcEngine::new(ctx(), backend)));
        }
        if settings.k_induction {
            let backend = backends
                .k_induction
                .take()
                .ok_or(DirectorError::MissingBackend(kinduction::NAME))?;
            engines.push(Box::new(KInductionEngine::new(ctx(), backend)));
        }
        if settings.invariant_generation {
            let backend = backends
                .invariant_generation
                .take()
                .ok_or(DirectorError::MissingBackend(crate::invariant_gen::NAME))?;
            engines.push(Box::new(InvariantGenerationEngine::new(ctx(), backend)));
        }
        if settings.smooth_counterexamples {
            let backend = backends
                .smoothing
                .take()
                .ok_or(DirectorError::MissingBackend(crate::smoothing::NAME))?;
            engines.push(Box::new(SmoothingEngine::new(ctx(), backend)));
        }
        if settings.pdr_max > 0 {
            let backend = backends
                .pdr
                .take()
                .ok_or(DirectorError::MissingBackend(pdr::NAME))?;
            engines.push(Box::new(PdrEngine::new(ctx(), backend)));
        }
        if settings.read_advice.is_some() {
            let backend = backends
                .advice
                .take()
                .ok_or(DirectorError::MissingBackend(crate::advice_engine::NAME))?;
            let advice = input_advice.clone().unwrap_or_default();
            engines.push(Box::new(AdviceEngine::new(ctx(), backend, advice)));
        }
        if settings.reduce_ivc {
            let backend = backends
                .ivc_reduction
                .take()
                .ok_or(DirectorError::MissingBackend(crate::ivc_reduction::NAME))?;
            engines.push(Box::new(IvcReductionEngine::new(ctx(), backend)));
        }
        if settings.all_ivcs {
            let backend = backends
                .all_ivcs
                .take()
                .ok_or(DirectorError::MissingBackend(crate::all_ivcs::NAME))?;
            engines.push(Box::new(AllIvcsEngine::new(ctx(), backend)));
        }
        Ok(engines)
    }

    fn initialize_unknowns(&mut self, properties: &[String]) {
        // a disabled engine can never pronounce, so it must not gate the
        // completely-unknown predicate
        if !self.settings.bounded_model_checking {
            for p in properties {
                self.bmc_unknowns.insert(p.clone(), 0);
            }
        }
        if !self.settings.k_induction {
            self.k_induction_unknowns.extend(properties.iter().cloned());
        }
        if self.settings.pdr_max == 0 {
            self.pdr_unknowns.extend(properties.iter().cloned());
        }
    }

    /// Run to completion and return the process exit code.
    pub fn run(&mut self) -> i32 {
        if !self.settings.embedded {
            self.print_header();
        }
        self.writer.begin();
        let coordinator = ShutdownCoordinator::install();
        self.start_engines();

        while !self.timeout()
            && self.properties_remaining()
            && self.some_engine_alive()
            && !self.some_engine_failed()
            && !coordinator.interrupted()
            && !shutdown::exit_requested()
        {
            self.process_messages();
            thread::sleep(Duration::from_millis(100));
        }

        self.process_messages();
        let mut exit_code = exit_codes::SUCCESS;
        if coordinator.try_claim() {
            self.post_processing();
            exit_code = self.report_failures();
        }

        // hosted runs reuse the process; stop engines instead of leaning
        // on process teardown
        if self.settings.embedded {
            self.stop_engines();
        }

        if !self.output.is_empty() {
            println!("{}", self.output);
        }
        let rendered = self.writer.rendered();
        if !rendered.is_empty() {
            println!("{rendered}");
        }
        exit_code
    }

    /// The full human-readable report, for embedding hosts.
    pub fn result(&self) -> String {
        format!("{} {}", self.output, self.writer.rendered())
    }

    fn start_engines(&mut self) {
        for engine in self.engines.drain(..) {
            self.handles.push(engine::spawn(engine));
        }
    }

    fn stop_engines(&mut self) {
        for handle in &self.handles {
            handle.request_stop();
        }
    }

    fn timeout(&self) -> bool {
        self.start_time.elapsed() > Duration::from_secs(self.settings.timeout)
    }

    fn properties_remaining(&self) -> bool {
        !self.remaining.is_empty()
    }

    fn some_engine_alive(&self) -> bool {
        self.handles.iter().any(|h| h.is_alive())
    }

    fn some_engine_failed(&self) -> bool {
        self.handles.iter().any(|h| h.failure().is_some())
    }

    fn process_messages(&mut self) {
        while let Ok(message) = self.incoming.try_recv() {
            self.broadcast(message);
        }
    }

    /// Deliver a message to the director's own handler, then to every
    /// engine in registration order.
    pub fn broadcast(&mut self, message: Message) {
        self.handle_message(&message);
        for handle in &self.handles {
            handle.deliver(message.clone());
        }
    }

    fn post_processing(&mut self) {
        self.write_unknowns();
        self.writer.end();
        self.write_advice();
        self.print_summary();
    }

    fn write_unknowns(&mut self) {
        if !self.remaining.is_empty() {
            let remaining = self.remaining.clone();
            let cexs = self.convert_inductive_counterexamples();
            let base_step = self.base_step;
            let runtime = self.runtime();
            self.writer
                .write_unknown(&remaining, base_step, &cexs, runtime);
        }
    }

    fn write_advice(&mut self) {
        if let Some(aw) = &self.advice_writer {
            aw.write();
        }
    }

    fn report_failures(&mut self) -> i32 {
        let mut exit_code = exit_codes::SUCCESS;
        for handle in &self.handles {
            if let Some(err) = handle.failure() {
                eprintln!("{} engine failed", handle.name());
                eprintln!("{err}");
                exit_code = match err {
                    EngineError::Ivc(_) => exit_codes::IVC_EXCEPTION,
                    _ => exit_codes::UNCAUGHT_EXCEPTION,
                };
                if self.settings.embedded {
                    eprintln!("failure during embedded run");
                }
                if self.timeout() {
                    eprintln!("timeout occurred");
                }
            }
        }
        exit_code
    }

    fn print_header(&mut self) {
        if !self.settings.xml_to_stdout {
            self.output.push_str(&format!(
                "There are {} properties to be checked.\n",
                self.remaining.len()
            ));
            self.output.push_str(&format!(
                "PROPERTIES TO BE CHECKED: [{}]\n",
                self.remaining.iter().join(", ")
            ));
        }
    }

    fn print_summary(&mut self) {
        if self.settings.xml_to_stdout || self.settings.embedded {
            return;
        }
        self.output
            .push_str("    -------------------------------------\n");
        self.output
            .push_str("    --^^--        SUMMARY          --^^--\n");
        self.output
            .push_str("    -------------------------------------\n");
        if !self.valid.is_empty() {
            self.output
                .push_str(&format!("VALID PROPERTIES: [{}]\n", self.valid.iter().join(", ")));
        }
        if !self.invalid.is_empty() {
            self.output.push_str(&format!(
                "INVALID PROPERTIES: [{}]\n",
                self.invalid.iter().join(", ")
            ));
        }
        let unknown: Vec<&String> = self
            .analysis_spec
            .node
            .properties
            .iter()
            .filter(|p| !self.valid.contains(p) && !self.invalid.contains(p))
            .collect();
        if !unknown.is_empty() {
            self.output.push_str(&format!(
                "UNKNOWN PROPERTIES: [{}]\n",
                unknown.iter().join(", ")
            ));
        }
    }

    fn runtime(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    fn extract(&self, property: &str, k: usize, model: &Model, concrete: bool) -> Counterexample {
        let model = reconstruct_model(
            &self.user_spec,
            &self.analysis_spec,
            model,
            property,
            k,
            concrete,
        );
        extract_counterexample(&self.user_spec, k, &model)
    }

    fn convert_inductive_counterexamples(&self) -> BTreeMap<String, Counterexample> {
        self.inductive_cexs
            .iter()
            .map(|(p, icm)| (p.clone(), self.extract(p, icm.length, &icm.model, false)))
            .collect()
    }

    /// Whether every configured proof engine has abandoned `property`.
    pub fn is_completely_unknown(&self, property: &str) -> bool {
        self.bmc_unknowns.contains_key(property)
            && self.k_induction_unknowns.contains(property)
            && self.pdr_unknowns.contains(property)
    }

    fn mark_unknowns(&mut self, message: &UnknownMessage) {
        match message.source.as_str() {
            bmc::NAME => {
                for p in &message.properties {
                    self.bmc_unknowns.insert(p.clone(), self.base_step);
                }
            }
            kinduction::NAME => {
                self.k_induction_unknowns
                    .extend(message.properties.iter().cloned());
            }
            pdr::NAME => {
                self.pdr_unknowns
                    .extend(message.properties.iter().cloned());
            }
            _ => {}
        }
    }

    fn completely_unknown_by_base_step(
        &self,
        message: &UnknownMessage,
    ) -> BTreeMap<usize, Vec<String>> {
        let mut groups: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for p in &message.properties {
            if self.is_completely_unknown(p) && self.remaining.contains(p) {
                let base = self.bmc_unknowns.get(p).copied().unwrap_or(0);
                groups.entry(base).or_default().push(p.clone());
            }
        }
        groups
    }

    /// Properties not yet settled, in their original order.
    pub fn remaining_properties(&self) -> &[String] {
        &self.remaining
    }

    /// Properties proven so far, in settlement order.
    pub fn valid_properties(&self) -> &[String] {
        &self.valid
    }

    /// Properties refuted so far, in settlement order.
    pub fn invalid_properties(&self) -> &[String] {
        &self.invalid
    }

    /// The deepest base step bounded model checking has reported.
    pub fn base_step(&self) -> usize {
        self.base_step
    }

    /// The advice read at construction, if any.
    pub fn input_advice(&self) -> Option<&Advice> {
        self.input_advice.as_ref()
    }
}

impl Drop for Director {
    fn drop(&mut self) {
        self.stop_engines();
    }
}

fn intersect(a: &[String], b: &[String]) -> Vec<String> {
    a.iter().filter(|p| b.contains(p)).cloned().collect()
}

impl MessageHandler for Director {
    fn on_valid(&mut self, message: &ValidMessage) {
        if let Some(destination) = message.itinerary.next_destination() {
            // in transit; the addressed engine will re-publish it
            if destination == EngineType::IvcReduction {
                if let Some(aw) = &mut self.advice_writer {
                    aw.add_invariants(&message.invariants);
                }
            }
            return;
        }

        let newly_valid = intersect(&message.properties, &self.remaining);
        if newly_valid.is_empty() {
            return;
        }

        self.remaining.retain(|p| !newly_valid.contains(p));
        self.valid.extend(newly_valid.iter().cloned());
        for p in &newly_valid {
            self.inductive_cexs.remove(p);
        }

        if let Some(aw) = &mut self.advice_writer {
            aw.add_invariants(&message.invariants);
        }

        let invariants: Vec<Expr> = if self.settings.reduce_ivc {
            message.invariants.clone()
        } else {
            Vec::new()
        };
        let runtime = self.runtime();

        if !self.settings.embedded && self.settings.reduce_ivc {
            let equations = &self.analysis_spec.node.equations;
            let ivc = right_side(&message.ivc, self.settings.all_assigned, equations);
            let all_ivcs: Vec<AllIvcs> = message
                .all_ivcs
                .iter()
                .map(|core| AllIvcs {
                    set: right_side(&core.set, self.settings.all_assigned, equations),
                    list: core.list.clone(),
                })
                .collect();
            self.writer.write_valid(
                &newly_valid,
                &message.source,
                message.k,
                message.proof_time,
                runtime,
                &invariants,
                &ivc,
                &all_ivcs,
                message.mivc_timed_out,
            );
        } else {
            self.writer.write_valid(
                &newly_valid,
                &message.source,
                message.k,
                message.proof_time,
                runtime,
                &invariants,
                &message.ivc,
                &message.all_ivcs,
                message.mivc_timed_out,
            );
        }
    }

    fn on_invalid(&mut self, message: &InvalidMessage) {
        if message.itinerary.next_destination().is_some() {
            return;
        }

        let newly_invalid = intersect(&message.properties, &self.remaining);
        if newly_invalid.is_empty() {
            return;
        }

        self.remaining.retain(|p| !newly_invalid.contains(p));
        self.invalid.extend(newly_invalid.iter().cloned());
        for p in &newly_invalid {
            self.inductive_cexs.remove(p);
        }

        let runtime = self.runtime();
        for property in &newly_invalid {
            let cex = self.extract(property, message.length, &message.model, true);
            self.writer
                .write_invalid(property, &message.source, &cex, runtime);
        }
    }

    fn on_inductive_counterexample(&mut self, message: &InductiveCounterexampleMessage) {
        for property in &message.properties {
            if self.remaining.contains(property) {
                self.inductive_cexs
                    .insert(property.clone(), message.clone());
            }
        }
    }

    fn on_unknown(&mut self, message: &UnknownMessage) {
        // the director's own re-broadcasts must not feed back
        if message.source == NAME {
            return;
        }

        self.mark_unknowns(message);

        for (base_step, unknowns) in self.completely_unknown_by_base_step(message) {
            self.remaining.retain(|p| !unknowns.contains(p));
            let cexs = self.convert_inductive_counterexamples();
            let runtime = self.runtime();
            self.writer
                .write_unknown(&unknowns, base_step, &cexs, runtime);
            for p in &unknowns {
                self.inductive_cexs.remove(p);
            }
            self.broadcast(Message::Unknown(UnknownMessage {
                source: NAME.to_string(),
                properties: unknowns,
            }));
        }
    }

    fn on_base_step(&mut self, message: &BaseStepMessage) {
        self.base_step = message.step;
        if !message.properties.is_empty() {
            let runtime = self.runtime();
            self.writer
                .write_base_step(&message.properties, message.step, runtime);
        }
    }

    // invariant broadcasts only matter to engines; the director neither
    // snapshots nor re-publishes them
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{
        AdviceBackend, AllIvcsBackend, AllIvcsOutcome, CheckOutcome, InductionBackend, IvcBackend,
        IvcOutcome, PdrBackend, PdrOutcome,
    };
    use crate::backends::{InvariantBackend, SmoothingBackend};
    use crate::messages::Itinerary;
    use lustre::semantics::{Model, Value};
    use lustre::syntax::{BinaryOp, Equation, Node, Type, VarDecl};
    use std::collections::BTreeSet;
    use std::sync::Mutex;
    use writers::{RecordingWriter, WriterCall};

    struct StalledBackend;

    impl InductionBackend for StalledBackend {
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
            _k: usize,
            _properties: &[String],
            _invariants: &[Expr],
        ) -> Result<CheckOutcome, EngineError> {
            Ok(CheckOutcome::Unknown)
        }
    }

    impl PdrBackend for StalledBackend {
        fn advance(&mut self, _property: &str) -> Result<PdrOutcome, EngineError> {
            Ok(PdrOutcome::Exhausted)
        }
    }

    impl InvariantBackend for StalledBackend {
        fn next_round(&mut self) -> Result<Option<Vec<Expr>>, EngineError> {
            Ok(None)
        }
    }

    impl SmoothingBackend for StalledBackend {
        fn smooth(
            &mut self,
            _properties: &[String],
            _length: usize,
            model: &Model,
        ) -> Result<Model, EngineError> {
            Ok(model.clone())
        }
    }

    impl IvcBackend for StalledBackend {
        fn reduce(
            &mut self,
            _property: &str,
            _k: usize,
            _invariants: &[Expr],
            ivc: &BTreeSet<String>,
        ) -> Result<IvcOutcome, EngineError> {
            Ok(IvcOutcome {
                core: ivc.clone(),
                timed_out: false,
            })
        }
    }

    impl AllIvcsBackend for StalledBackend {
        fn enumerate(
            &mut self,
            _property: &str,
            _k: usize,
            ivc: &BTreeSet<String>,
        ) -> Result<AllIvcsOutcome, EngineError> {
            Ok(AllIvcsOutcome {
                cores: vec![AllIvcs::new(ivc.iter().cloned())],
                timed_out: false,
            })
        }
    }

    impl AdviceBackend for StalledBackend {
        fn confirm(&mut self, invariants: &[Expr]) -> Result<Vec<Expr>, EngineError> {
            Ok(invariants.to_vec())
        }
    }

    fn all_backends() -> Backends {
        Backends {
            bmc: Some(Box::new(StalledBackend)),
            k_induction: Some(Box::new(StalledBackend)),
            invariant_generation: Some(Box::new(StalledBackend)),
            smoothing: Some(Box::new(StalledBackend)),
            pdr: Some(Box::new(StalledBackend)),
            advice: Some(Box::new(StalledBackend)),
            ivc_reduction: Some(Box::new(StalledBackend)),
            all_ivcs: Some(Box::new(StalledBackend)),
        }
    }

    fn no_engines() -> Settings {
        Settings {
            bounded_model_checking: false,
            k_induction: false,
            invariant_generation: false,
            pdr_max: 0,
            ..Settings::default()
        }
    }

    fn spec(properties: &[&str]) -> Specification {
        Specification::new(Node {
            name: "main".to_string(),
            inputs: vec![VarDecl::new("x", Type::Int)],
            outputs: properties.iter().map(|p| VarDecl::new(p, Type::Bool)).collect(),
            locals: vec![],
            equations: properties
                .iter()
                .map(|p| {
                    Equation::new(
                        *p,
                        Expr::binary(BinaryOp::GreaterEqual, Expr::id("x"), Expr::Int(0)),
                    )
                })
                .collect(),
            properties: properties.iter().map(|p| p.to_string()).collect(),
            ivc: vec![],
        })
    }

    fn director(
        settings: Settings,
        properties: &[&str],
    ) -> (Director, Arc<Mutex<Vec<WriterCall>>>) {
        let writer = RecordingWriter::new();
        let log = writer.log();
        let spec = spec(properties);
        let director = Director::with_writer(
            settings,
            spec.clone(),
            spec,
            all_backends(),
            Box::new(writer),
        )
        .unwrap();
        (director, log)
    }

    fn valid_message(properties: &[&str], k: usize, itinerary: Itinerary) -> Message {
        Message::Valid(ValidMessage {
            source: bmc::NAME.to_string(),
            properties: properties.iter().map(|p| p.to_string()).collect(),
            k,
            proof_time: -1.0,
            invariants: vec![Expr::id("inv")],
            ivc: BTreeSet::new(),
            all_ivcs: vec![],
            mivc_timed_out: false,
            itinerary,
        })
    }

    fn unknown_message(source: &str, properties: &[&str]) -> Message {
        Message::Unknown(UnknownMessage {
            source: source.to_string(),
            properties: properties.iter().map(|p| p.to_string()).collect(),
        })
    }

    fn valid_calls(log: &Arc<Mutex<Vec<WriterCall>>>) -> usize {
        log.lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, WriterCall::Valid { .. }))
            .count()
    }

    #[test]
    fn test_single_valid() {
        let settings = Settings {
            k_induction: false,
            invariant_generation: false,
            pdr_max: 0,
            ..Settings::default()
        };
        let (mut d, log) = director(settings, &["p1", "p2"]);
        d.broadcast(valid_message(&["p1"], 3, Itinerary::empty()));

        assert_eq!(d.valid_properties(), &["p1".to_string()]);
        assert_eq!(d.remaining_properties(), &["p2".to_string()]);
        let calls = log.lock().unwrap();
        match &calls[..] {
            [WriterCall::Valid { properties, k, source, .. }] => {
                assert_eq!(properties, &vec!["p1".to_string()]);
                assert_eq!(*k, 3);
                assert_eq!(source, bmc::NAME);
            }
            other => panic!("unexpected writer calls: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_valid_ignored() {
        let (mut d, log) = director(no_engines(), &["p1", "p2"]);
        d.broadcast(valid_message(&["p1"], 3, Itinerary::empty()));
        d.broadcast(valid_message(&["p1"], 3, Itinerary::empty()));

        assert_eq!(valid_calls(&log), 1);
        assert_eq!(d.valid_properties(), &["p1".to_string()]);
    }

    #[test]
    fn test_invalid_with_counterexample() {
        let (mut d, log) = director(no_engines(), &["p1"]);
        let mut model = Model::new();
        model.set("x", 0, Value::Int(1));
        model.set("x", 1, Value::Int(-1));
        d.broadcast(Message::Invalid(InvalidMessage {
            source: bmc::NAME.to_string(),
            properties: vec!["p1".to_string()],
            length: 2,
            model,
            itinerary: Itinerary::empty(),
        }));

        assert_eq!(d.invalid_properties(), &["p1".to_string()]);
        assert!(d.remaining_properties().is_empty());
        let calls = log.lock().unwrap();
        match &calls[..] {
            [WriterCall::Invalid { property, length, .. }] => {
                assert_eq!(property, "p1");
                assert_eq!(*length, 2);
            }
            other => panic!("unexpected writer calls: {other:?}"),
        }
    }

    #[test]
    fn test_completely_unknown_commit() {
        // all three proof engines configured
        let (mut d, log) = director(Settings::default(), &["p1"]);
        d.broadcast(Message::BaseStep(BaseStepMessage {
            step: 5,
            properties: vec!["p1".to_string()],
        }));
        d.broadcast(unknown_message(bmc::NAME, &["p1"]));
        assert_eq!(d.remaining_properties(), &["p1".to_string()]);
        d.broadcast(unknown_message(kinduction::NAME, &["p1"]));
        assert_eq!(d.remaining_properties(), &["p1".to_string()]);
        d.broadcast(unknown_message(pdr::NAME, &["p1"]));

        assert!(d.remaining_properties().is_empty());
        assert!(d.is_completely_unknown("p1"));
        let calls = log.lock().unwrap();
        assert!(calls.iter().any(|c| matches!(
            c,
            WriterCall::Unknown { properties, base_step, .. }
                if properties == &vec!["p1".to_string()] && *base_step == 5
        )));
    }

    #[test]
    fn test_in_transit_valid_feeds_advice_only() {
        let advice_path =
            std::env::temp_dir().join(format!("director_advice_{}.json", std::process::id()));
        let settings = Settings {
            reduce_ivc: true,
            all_ivcs: true,
            write_advice: Some(advice_path.clone()),
            ..no_engines()
        };
        let (mut d, log) = director(settings, &["p1"]);
        let itinerary = Itinerary::new(vec![EngineType::IvcReduction, EngineType::IvcReductionAll]);
        d.broadcast(valid_message(&["p1"], 3, itinerary));

        assert_eq!(valid_calls(&log), 0);
        assert_eq!(d.remaining_properties(), &["p1".to_string()]);
        d.write_advice();
        let advice = advice::read(&advice_path).unwrap();
        std::fs::remove_file(&advice_path).ok();
        assert_eq!(advice.invariants, vec![Expr::id("inv")]);
    }

    #[test]
    fn test_itinerary_passthrough_then_settles_once() {
        let (mut d, log) = director(no_engines(), &["p1"]);
        let in_transit = Itinerary::new(vec![EngineType::Smoothing]);
        d.broadcast(valid_message(&["p1"], 2, in_transit.clone()));
        assert_eq!(d.remaining_properties(), &["p1".to_string()]);
        assert_eq!(valid_calls(&log), 0);

        d.broadcast(valid_message(&["p1"], 2, in_transit.advanced()));
        assert!(d.remaining_properties().is_empty());
        assert_eq!(valid_calls(&log), 1);

        d.broadcast(valid_message(&["p1"], 2, Itinerary::empty()));
        assert_eq!(valid_calls(&log), 1);
    }

    #[test]
    fn test_timeout_sweep() {
        let settings = Settings {
            timeout: 0,
            ..no_engines()
        };
        let (mut d, log) = director(settings, &["p1", "p2"]);
        let exit_code = d.run();

        assert_eq!(exit_code, exit_codes::SUCCESS);
        let calls = log.lock().unwrap();
        let unknowns: Vec<_> = calls
            .iter()
            .filter(|c| matches!(c, WriterCall::Unknown { .. }))
            .collect();
        match &unknowns[..] {
            [WriterCall::Unknown { properties, base_step, .. }] => {
                assert_eq!(properties, &vec!["p1".to_string(), "p2".to_string()]);
                assert_eq!(*base_step, 0);
            }
            other => panic!("expected one unknown write, got {other:?}"),
        }
        assert_eq!(calls.first(), Some(&WriterCall::Begin));
        assert!(calls.contains(&WriterCall::End));
    }

    #[test]
    fn test_roster_stays_disjoint() {
        let (mut d, _log) = director(no_engines(), &["p1", "p2", "p3"]);
        d.broadcast(valid_message(&["p1"], 1, Itinerary::empty()));
        let mut model = Model::new();
        model.set("x", 0, Value::Int(0));
        d.broadcast(Message::Invalid(InvalidMessage {
            source: pdr::NAME.to_string(),
            properties: vec!["p2".to_string(), "p1".to_string()],
            length: 1,
            model,
            itinerary: Itinerary::empty(),
        }));

        assert_eq!(d.valid_properties(), &["p1".to_string()]);
        assert_eq!(d.invalid_properties(), &["p2".to_string()]);
        assert_eq!(d.remaining_properties(), &["p3".to_string()]);
    }

    #[test]
    fn test_inductive_counterexamples_follow_roster() {
        let (mut d, log) = director(Settings::default(), &["p1", "p2"]);
        let mut model = Model::new();
        model.set("x", 0, Value::Int(7));
        let icm = InductiveCounterexampleMessage {
            properties: vec!["p1".to_string(), "p2".to_string()],
            length: 1,
            model,
        };
        d.broadcast(Message::InductiveCounterexample(icm.clone()));
        d.broadcast(valid_message(&["p1"], 1, Itinerary::empty()));
        // p1 settled; only p2's trace should survive into unknown reports
        d.broadcast(unknown_message(bmc::NAME, &["p2"]));
        d.broadcast(unknown_message(kinduction::NAME, &["p2"]));
        d.broadcast(unknown_message(pdr::NAME, &["p2"]));

        let calls = log.lock().unwrap();
        assert!(calls.iter().any(|c| matches!(
            c,
            WriterCall::Unknown { inductive_cex_properties, .. }
                if inductive_cex_properties == &vec!["p2".to_string()]
        )));
        // a late trace for a settled property is not recorded
        drop(calls);
        d.broadcast(Message::InductiveCounterexample(icm));
        assert!(d.inductive_cexs.is_empty());
    }

    #[test]
    fn test_unknowns_group_by_base_step() {
        let (mut d, log) = director(Settings::default(), &["p1", "p2"]);
        d.broadcast(Message::BaseStep(BaseStepMessage {
            step: 2,
            properties: vec![],
        }));
        d.broadcast(unknown_message(bmc::NAME, &["p1"]));
        d.broadcast(Message::BaseStep(BaseStepMessage {
            step: 4,
            properties: vec![],
        }));
        d.broadcast(unknown_message(bmc::NAME, &["p2"]));
        d.broadcast(unknown_message(kinduction::NAME, &["p1", "p2"]));
        d.broadcast(unknown_message(pdr::NAME, &["p1", "p2"]));

        let calls = log.lock().unwrap();
        let unknowns: Vec<_> = calls
            .iter()
            .filter_map(|c| match c {
                WriterCall::Unknown { properties, base_step, .. } => {
                    Some((properties.clone(), *base_step))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            unknowns,
            vec![
                (vec!["p1".to_string()], 2),
                (vec!["p2".to_string()], 4),
            ]
        );
        assert!(d.remaining_properties().is_empty());
    }

    #[test]
    fn test_missing_backend_is_a_construction_error() {
        let settings = Settings::default();
        let writer = RecordingWriter::new();
        let s = spec(&["p1"]);
        let result = Director::with_writer(
            settings,
            s.clone(),
            s,
            Backends::none(),
            Box::new(writer),
        );
        assert!(matches!(result, Err(DirectorError::MissingBackend(name)) if name == bmc::NAME));
    }

    #[test]
    fn test_broadcast_fans_out_to_engines() {

        struct CountingEngine {
            ctx: Context,
            seen: Arc<Mutex<Vec<Message>>>,
        }

        impl MessageHandler for CountingEngine {}

        impl Engine for CountingEngine {
            fn name(&self) -> &'static str {
                "counting"
            }

            fn context(&self) -> &Context {
                &self.ctx
            }

            fn run(&mut self) -> Result<(), EngineError> {
                while !self.ctx.stop_requested() {
                    if let Some(m) = self.ctx.next_message(Duration::from_millis(10)) {
                        self.seen.lock().unwrap().push(m);
                    }
                }
                Ok(())
            }
        }

        let (mut d, _log) = director(no_engines(), &["p1"]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (to_director, _unused) = mpsc::channel::<Message>();
        let ctx = Context::new(
            Arc::clone(&d.analysis_spec),
            Arc::clone(&d.settings),
            to_director,
        );
        let handle = engine::spawn(Box::new(CountingEngine {
            ctx,
            seen: Arc::clone(&seen),
        }));
        d.handles.push(handle);

        d.broadcast(Message::BaseStep(BaseStepMessage {
            step: 1,
            properties: vec![],
        }));
        let deadline = Instant::now() + Duration::from_secs(5);
        while seen.lock().unwrap().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        d.stop_engines();

        assert_eq!(d.base_step(), 1);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
