// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The engine contract and the thread harness the director runs engines
//! on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use lustre::syntax::Specification;
use thiserror::Error;

use crate::director;
use crate::messages::{Message, MessageHandler};
use crate::settings::Settings;

/// A fatal error that terminated an engine's thread.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The solver behind the engine failed
    #[error("solver failure: {0}")]
    Solver(String),
    /// Validity-core extraction failed
    #[error("validity core extraction failure: {0}")]
    Ivc(String),
    /// The advice backing store failed
    #[error("advice failure: {0}")]
    Advice(String),
}

/// A unit of proof work the director can run, message, and stop.
///
/// Engines make no promises beyond this contract: they run on their own
/// thread until done or stopped, receive the director's fan-out through
/// their [`MessageHandler`] methods, and surface a fatal error by
/// returning it from [`Engine::run`].
pub trait Engine: MessageHandler + Send {
    /// The engine's name, used as the message source tag.
    fn name(&self) -> &'static str;

    /// The shared plumbing, so the harness can reach the inbox and stop
    /// flag before moving the engine onto its thread.
    fn context(&self) -> &Context;

    /// Do the work. Runs on a dedicated thread; returns when every
    /// property this engine tracks is settled, the engine has given up,
    /// or a stop was requested.
    fn run(&mut self) -> Result<(), EngineError>;
}

/// The plumbing every engine owns: its view of the analysis, its share of
/// the property list, and both ends of its messaging.
pub struct Context {
    /// The analysis form of the program
    pub spec: Arc<Specification>,
    /// The run's configuration
    pub settings: Arc<Settings>,
    /// Properties this engine is still working on; settled properties are
    /// retired as the director's fan-out reports them
    pub properties: Vec<String>,
    to_director: Sender<Message>,
    incoming: Receiver<Message>,
    inbox: Sender<Message>,
    stop: Arc<AtomicBool>,
}

impl Context {
    /// Plumbing for one engine, starting from the full property list.
    pub fn new(spec: Arc<Specification>, settings: Arc<Settings>, to_director: Sender<Message>) -> Self {
        let (inbox, incoming) = mpsc::channel();
        Context {
            properties: spec.node.properties.clone(),
            spec,
            settings,
            to_director,
            incoming,
            inbox,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A sender delivering into this engine's mailbox.
    pub fn inbox(&self) -> Sender<Message> {
        self.inbox.clone()
    }

    /// The cooperative stop flag shared with the harness.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Whether a stop was requested. Engines check this at every loop
    /// boundary.
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Publish a message to the director. A director that has gone away
    /// just means the run is over.
    pub fn publish(&self, message: Message) {
        let _ = self.to_director.send(message);
    }

    /// Every message waiting in the mailbox.
    pub fn drain(&mut self) -> Vec<Message> {
        let mut messages = Vec::new();
        while let Ok(m) = self.incoming.try_recv() {
            messages.push(m);
        }
        messages
    }

    /// Block briefly for the next message.
    pub fn next_message(&mut self, timeout: Duration) -> Option<Message> {
        match self.incoming.recv_timeout(timeout) {
            Ok(m) => Some(m),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drop settled properties from this engine's share of the work.
    pub fn retire(&mut self, settled: &[String]) {
        self.properties.retain(|p| !settled.contains(p));
    }

    /// The standard reaction to the director's fan-out: anything settled
    /// elsewhere is no longer this engine's problem.
    pub fn note_settled(&mut self, message: &Message) {
        match message {
            Message::Valid(m) => self.retire(&m.properties),
            Message::Invalid(m) => self.retire(&m.properties),
            Message::Unknown(m) if m.source == director::NAME => self.retire(&m.properties),
            _ => {}
        }
    }
}

/// A running engine as the director sees it.
pub struct EngineHandle {
    name: &'static str,
    inbox: Sender<Message>,
    stop: Arc<AtomicBool>,
    failure: Arc<Mutex<Option<EngineError>>>,
    thread: JoinHandle<()>,
}

/// Move an engine onto its own named thread. A fatal error from
/// [`Engine::run`] is parked in the handle for the director to poll.
pub fn spawn(mut engine: Box<dyn Engine>) -> EngineHandle {
    let name = engine.name();
    let inbox = engine.context().inbox();
    let stop = engine.context().stop_flag();
    let failure = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&failure);
    let thread = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            if let Err(err) = engine.run() {
                log::error!("{name} engine failed: {err}");
                *slot.lock().unwrap() = Some(err);
            }
        })
        .expect("could not spawn engine thread");
    EngineHandle {
        name,
        inbox,
        stop,
        failure,
        thread,
    }
}

impl EngineHandle {
    /// The engine's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Deliver a fan-out message. An engine that already exited just
    /// stops listening.
    pub fn deliver(&self, message: Message) {
        let _ = self.inbox.send(message);
    }

    /// Ask the engine to stop at its next loop boundary.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Whether the engine's thread is still running.
    pub fn is_alive(&self) -> bool {
        !self.thread.is_finished()
    }

    /// The fatal error that ended the engine, if one did.
    pub fn failure(&self) -> Option<EngineError> {
        self.failure.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lustre::syntax::{Node, Specification};

    fn context() -> (Context, Sender<Message>, Receiver<Message>) {
        let spec = Arc::new(Specification::new(Node {
            name: "main".to_string(),
            inputs: vec![],
            outputs: vec![],
            locals: vec![],
            equations: vec![],
            properties: vec!["p1".to_string(), "p2".to_string()],
            ivc: vec![],
        }));
        let (to_director, from_engines) = mpsc::channel();
        let ctx = Context::new(spec, Arc::new(Settings::default()), to_director.clone());
        (ctx, to_director, from_engines)
    }

    struct IdleEngine {
        ctx: Context,
        result: Result<(), EngineError>,
    }

    impl MessageHandler for IdleEngine {}

    impl Engine for IdleEngine {
        fn name(&self) -> &'static str {
            "idle"
        }

        fn context(&self) -> &Context {
            &self.ctx
        }

        fn run(&mut self) -> Result<(), EngineError> {
            while !self.ctx.stop_requested() {
                thread::sleep(Duration::from_millis(1));
            }
            self.result.clone()
        }
    }

    #[test]
    fn test_note_settled_retires() {
        let (mut ctx, _sender, _receiver) = context();
        ctx.note_settled(&Message::Unknown(crate::messages::UnknownMessage {
            source: "bmc".to_string(),
            properties: vec!["p1".to_string()],
        }));
        // only the director's unknowns are authoritative
        assert_eq!(ctx.properties, vec!["p1", "p2"]);

        ctx.note_settled(&Message::Unknown(crate::messages::UnknownMessage {
            source: director::NAME.to_string(),
            properties: vec!["p1".to_string()],
        }));
        assert_eq!(ctx.properties, vec!["p2"]);
    }

    #[test]
    fn test_harness_captures_failure() {
        let (ctx, _sender, _receiver) = context();
        let handle = spawn(Box::new(IdleEngine {
            ctx,
            result: Err(EngineError::Solver("connection lost".to_string())),
        }));
        assert!(handle.is_alive());
        assert_eq!(handle.failure(), None);

        handle.request_stop();
        while handle.is_alive() {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(
            handle.failure(),
            Some(EngineError::Solver("connection lost".to_string()))
        );
    }
}
