//! Cooperative step runner
//!
//! A [`Pipeline`] executes an ordered list of [`Step`]s against one context
//! value. A step receives the context and a [`Next`] continuation and
//! resolves it exactly once:
//!
//! - [`Next::proceed`] advances to the following step,
//! - [`Next::skip`] leaves the innermost [`Step::group`] (or ends the run at
//!   the top level),
//! - [`Next::halt`] ends the whole run.
//!
//! The continuation may be stored and resolved after the step returned, for
//! example once an asynchronous hook finished. Nothing else runs on that
//! context in the meantime. A continuation dropped without being resolved
//! halts the run, since it can never resume.
//!
//! Resolutions made while the step is still on the stack are picked up by
//! the driver loop after the step returns, so long synchronous pipelines do
//! not grow the call stack.
//!
//! ```
//! use wayfinder::pipeline::{Outcome, Pipeline, Step};
//!
//! let steps = vec![
//!     Step::run("first", |log: &mut Vec<&str>, next| {
//!         log.push("first");
//!         next.proceed();
//!     }),
//!     Step::branch(
//!         |log: &Vec<&str>| log.len() == 1,
//!         vec![Step::run("then", |log: &mut Vec<&str>, next| {
//!             log.push("then");
//!             next.proceed();
//!         })],
//!         vec![],
//!     ),
//! ];
//!
//! Pipeline::run(steps, Vec::new(), |log, outcome| {
//!     assert_eq!(log, vec!["first", "then"]);
//!     assert_eq!(outcome, Outcome::Completed);
//! });
//! ```

use crate::trace_log;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// How a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every step proceeded (or the top level was skipped)
    Completed,
    /// A step halted the run, or dropped its continuation
    Halted,
    /// A step panicked; the panic resumes after the finish callback
    Panicked,
}

type RunFn<C> = Box<dyn FnOnce(&mut C, Next<C>)>;
type PredicateFn<C> = Box<dyn FnOnce(&C) -> bool>;
type GenerateFn<C> = Box<dyn FnOnce(&C) -> Vec<Step<C>>>;
type FinishFn<C> = Box<dyn FnOnce(C, Outcome)>;

/// One unit of work in a pipeline
pub enum Step<C: 'static> {
    /// Run a function that resolves a continuation
    Run { name: &'static str, f: RunFn<C> },
    /// Choose one of two step lists from the context; both splice into the
    /// current sequence
    Branch {
        predicate: PredicateFn<C>,
        then: Vec<Step<C>>,
        otherwise: Vec<Step<C>>,
    },
    /// Generate steps from the context; they splice into the current sequence
    Expand(GenerateFn<C>),
    /// Inline sub-sequence that [`Next::skip`] can leave early
    Group(Vec<Step<C>>),
}

impl<C: 'static> Step<C> {
    /// A step that runs `f`
    pub fn run<F>(name: &'static str, f: F) -> Self
    where
        F: FnOnce(&mut C, Next<C>) + 'static,
    {
        Step::Run {
            name,
            f: Box::new(f),
        }
    }

    /// A conditional step
    pub fn branch<P>(predicate: P, then: Vec<Step<C>>, otherwise: Vec<Step<C>>) -> Self
    where
        P: FnOnce(&C) -> bool + 'static,
    {
        Step::Branch {
            predicate: Box::new(predicate),
            then,
            otherwise,
        }
    }

    /// A step that expands into generated steps
    pub fn expand<G>(generate: G) -> Self
    where
        G: FnOnce(&C) -> Vec<Step<C>> + 'static,
    {
        Step::Expand(Box::new(generate))
    }

    /// A scoped sub-sequence
    pub fn group(steps: Vec<Step<C>>) -> Self {
        Step::Group(steps)
    }
}

impl<C: 'static> fmt::Debug for Step<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Run { name, .. } => write!(f, "Run({})", name),
            Step::Branch {
                then, otherwise, ..
            } => write!(f, "Branch({}|{})", then.len(), otherwise.len()),
            Step::Expand(_) => f.write_str("Expand"),
            Step::Group(steps) => write!(f, "Group({})", steps.len()),
        }
    }
}

// ============================================================================
// Run state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    /// Step is on the stack and has not resolved yet
    Waiting,
    /// Step returned without resolving; resolution resumes the driver
    Detached,
    Proceed,
    Skip,
    Halt,
}

struct Run<C: 'static> {
    frames: Vec<VecDeque<Step<C>>>,
    context: Option<C>,
    on_finish: Option<FinishFn<C>>,
}

impl<C: 'static> Run<C> {
    /// Pop the next step, discarding exhausted frames.
    fn next_step(&mut self) -> Option<Step<C>> {
        while let Some(frame) = self.frames.last_mut() {
            if let Some(step) = frame.pop_front() {
                return Some(step);
            }
            self.frames.pop();
        }
        None
    }

    /// Splice steps in front of the current frame.
    fn splice(&mut self, steps: Vec<Step<C>>) {
        match self.frames.last_mut() {
            Some(frame) => {
                for step in steps.into_iter().rev() {
                    frame.push_front(step);
                }
            }
            None => self.frames.push(steps.into()),
        }
    }
}

type Shared<C> = Rc<RefCell<Run<C>>>;

/// Continuation handed to a [`Step::run`] function
pub struct Next<C: 'static> {
    run: Shared<C>,
    signal: Rc<Cell<Signal>>,
    resolved: bool,
}

impl<C: 'static> Next<C> {
    /// Advance to the next step
    pub fn proceed(mut self) {
        self.resolve(Signal::Proceed);
    }

    /// Leave the innermost group; at the top level this ends the run
    pub fn skip(mut self) {
        self.resolve(Signal::Skip);
    }

    /// End the run without executing further steps
    pub fn halt(mut self) {
        self.resolve(Signal::Halt);
    }

    fn resolve(&mut self, signal: Signal) {
        self.resolved = true;
        match self.signal.get() {
            Signal::Waiting => self.signal.set(signal),
            Signal::Detached => Pipeline::resume(&self.run, signal),
            _ => {}
        }
    }
}

impl<C: 'static> Drop for Next<C> {
    fn drop(&mut self) {
        if self.resolved {
            return;
        }
        trace_log!("pipeline continuation dropped unresolved; halting");
        if self.signal.get() == Signal::Detached && std::thread::panicking() {
            return;
        }
        self.resolve(Signal::Halt);
    }
}

impl<C: 'static> fmt::Debug for Next<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("signal", &self.signal.get())
            .field("resolved", &self.resolved)
            .finish()
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Step runner entry point
pub struct Pipeline;

impl Pipeline {
    /// Run `steps` over `context`.
    ///
    /// `on_finish` receives the context back exactly once, when the run
    /// ends. If every step resolves synchronously this happens before
    /// `run` returns.
    pub fn run<C, F>(steps: Vec<Step<C>>, context: C, on_finish: F)
    where
        C: 'static,
        F: FnOnce(C, Outcome) + 'static,
    {
        let run = Rc::new(RefCell::new(Run {
            frames: vec![steps.into()],
            context: Some(context),
            on_finish: Some(Box::new(on_finish)),
        }));
        Self::drive(&run);
    }

    fn resume<C: 'static>(run: &Shared<C>, signal: Signal) {
        match signal {
            Signal::Proceed => Self::drive(run),
            Signal::Skip => {
                run.borrow_mut().frames.pop();
                Self::drive(run);
            }
            Signal::Halt => Self::finish(run, Outcome::Halted),
            Signal::Waiting | Signal::Detached => {}
        }
    }

    fn drive<C: 'static>(run: &Shared<C>) {
        loop {
            let step = run.borrow_mut().next_step();
            let Some(step) = step else {
                Self::finish(run, Outcome::Completed);
                return;
            };

            match step {
                Step::Group(steps) => {
                    trace_log!("pipeline: enter group of {} steps", steps.len());
                    run.borrow_mut().frames.push(steps.into());
                }
                Step::Branch {
                    predicate,
                    then,
                    otherwise,
                } => {
                    let chosen = {
                        let state = run.borrow();
                        match state.context.as_ref() {
                            Some(context) => predicate(context),
                            None => return,
                        }
                    };
                    trace_log!("pipeline: branch -> {}", if chosen { "then" } else { "otherwise" });
                    run.borrow_mut()
                        .splice(if chosen { then } else { otherwise });
                }
                Step::Expand(generate) => {
                    let steps = {
                        let state = run.borrow();
                        match state.context.as_ref() {
                            Some(context) => generate(context),
                            None => return,
                        }
                    };
                    trace_log!("pipeline: expanded into {} steps", steps.len());
                    run.borrow_mut().splice(steps);
                }
                Step::Run { name, f } => {
                    let Some(mut context) = run.borrow_mut().context.take() else {
                        return;
                    };
                    let signal = Rc::new(Cell::new(Signal::Waiting));
                    let next = Next {
                        run: Rc::clone(run),
                        signal: Rc::clone(&signal),
                        resolved: false,
                    };

                    trace_log!("pipeline: step '{}'", name);
                    let result = panic::catch_unwind(AssertUnwindSafe(|| f(&mut context, next)));
                    run.borrow_mut().context = Some(context);

                    if let Err(payload) = result {
                        trace_log!("pipeline: step '{}' panicked", name);
                        Self::finish(run, Outcome::Panicked);
                        panic::resume_unwind(payload);
                    }

                    match signal.get() {
                        Signal::Waiting => {
                            trace_log!("pipeline: step '{}' suspended", name);
                            signal.set(Signal::Detached);
                            return;
                        }
                        Signal::Proceed => {}
                        Signal::Skip => {
                            run.borrow_mut().frames.pop();
                        }
                        Signal::Halt => {
                            Self::finish(run, Outcome::Halted);
                            return;
                        }
                        Signal::Detached => return,
                    }
                }
            }
        }
    }

    fn finish<C: 'static>(run: &Shared<C>, outcome: Outcome) {
        let (context, on_finish) = {
            let mut state = run.borrow_mut();
            state.frames.clear();
            (state.context.take(), state.on_finish.take())
        };
        if let (Some(context), Some(on_finish)) = (context, on_finish) {
            on_finish(context, outcome);
        }
    }
}
