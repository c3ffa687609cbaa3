// SPDX-License-Identifier: MIT OR Apache-2.0
//! Step sequencer.
//!
//! A state machine over an ordered list of steps and their targets:
//! - `play` validates the lists and activates the first step
//! - `complete_current_and_advance` runs the completion hook and moves on
//! - `stop` returns to idle
//!
//! Transitions always run in the order
//! `on_completed (old) -> index update -> on_enter (new) -> step_changed`,
//! or `on_completed -> index past end -> stopped`.

use crate::error::ConfigurationError;
use crate::signal::Signal;
use crate::step::{Hook, Step};
use crate::target::{TargetHandle, TargetResolver};
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequencerState {
    /// No active sequence
    #[default]
    Idle,
    /// Showing the step at this index
    Playing(usize),
}

impl SequencerState {
    /// Check if a sequence is active
    pub fn is_playing(&self) -> bool {
        matches!(self, SequencerState::Playing(_))
    }

    /// Current index, if playing
    pub fn index(&self) -> Option<usize> {
        match self {
            SequencerState::Idle => None,
            SequencerState::Playing(index) => Some(*index),
        }
    }
}

/// Payload of the `step_changed` notification
#[derive(Clone)]
pub struct StepChange {
    /// Index of the new step
    pub index: usize,
    /// The step that just became current
    pub step: Rc<Step>,
    /// Its target, absent if none was supplied or the key did not resolve
    pub target: Option<TargetHandle>,
}

#[derive(Default)]
struct Sequence {
    steps: Vec<Rc<Step>>,
    targets: Vec<Option<TargetHandle>>,
}

/// Owns the step list, the target list and the current position.
///
/// Methods take `&self` so that signal handlers and step hooks can call back
/// into the sequencer while a transition is being delivered. Share it as
/// `Rc<StepSequencer>`.
///
/// A step's `on_completed` hook must not complete the step again; such a
/// nested call is ignored with a warning.
pub struct StepSequencer {
    sequence: RefCell<Sequence>,
    state: Cell<SequencerState>,
    /// Bumped on every transition so a hook that moved the sequencer can be detected
    epoch: Cell<u64>,
    completing: Cell<bool>,
    resolver: RefCell<Option<Rc<dyn TargetResolver>>>,
    step_changed: Signal<StepChange>,
    stopped: Signal<()>,
}

impl StepSequencer {
    /// Create an idle sequencer
    pub fn new() -> Self {
        Self {
            sequence: RefCell::new(Sequence::default()),
            state: Cell::new(SequencerState::Idle),
            epoch: Cell::new(0),
            completing: Cell::new(false),
            resolver: RefCell::new(None),
            step_changed: Signal::new(),
            stopped: Signal::new(),
        }
    }

    /// Fired after a step becomes current and its enter hook has run
    pub fn step_changed(&self) -> &Signal<StepChange> {
        &self.step_changed
    }

    /// Fired once when a playing sequence stops
    pub fn stopped(&self) -> &Signal<()> {
        &self.stopped
    }

    /// Register the resolver used by [`Self::play_by_key`]
    pub fn set_resolver(&self, resolver: Rc<dyn TargetResolver>) {
        *self.resolver.borrow_mut() = Some(resolver);
    }

    /// Start a sequence.
    ///
    /// Calling this while already playing restarts with the new lists; the
    /// previous sequence is dropped without a `stopped` notification.
    pub fn play(
        &self,
        steps: Vec<Step>,
        targets: Vec<Option<TargetHandle>>,
    ) -> Result<(), ConfigurationError> {
        if steps.len() != targets.len() {
            return Err(ConfigurationError::LengthMismatch {
                steps: steps.len(),
                targets: targets.len(),
            });
        }

        self.start(steps, targets);
        Ok(())
    }

    /// Start a sequence whose targets are looked up by key.
    ///
    /// Every key is resolved before the first step activates. A key that
    /// does not resolve becomes an absent target.
    pub fn play_by_key<K: AsRef<str>>(
        &self,
        steps: Vec<Step>,
        keys: &[K],
    ) -> Result<(), ConfigurationError> {
        let resolver = self
            .resolver
            .borrow()
            .clone()
            .ok_or(ConfigurationError::MissingResolver)?;

        if steps.len() != keys.len() {
            return Err(ConfigurationError::LengthMismatch {
                steps: steps.len(),
                targets: keys.len(),
            });
        }

        let targets = keys
            .iter()
            .map(|key| {
                let target = resolver.resolve(key.as_ref());
                if target.is_none() {
                    tracing::debug!("Tour key '{}' did not resolve to a target", key.as_ref());
                }
                target
            })
            .collect();

        self.start(steps, targets);
        Ok(())
    }

    /// Stop the sequence. Does nothing when idle.
    pub fn stop(&self) {
        if !self.is_playing() {
            return;
        }
        self.finish();
    }

    /// Complete the current step and advance to the next one.
    ///
    /// Runs the current step's completion hook first. Completing the last
    /// step stops the sequence. Does nothing when idle.
    pub fn complete_current_and_advance(&self) {
        let SequencerState::Playing(index) = self.state.get() else {
            return;
        };

        if self.completing.get() {
            tracing::warn!("Ignoring nested step completion from inside a completion hook");
            return;
        }

        let epoch = self.epoch.get();
        if let Some(step) = self.step_at(index) {
            if let Some(hook) = step.hooks().on_completed.clone() {
                self.completing.set(true);
                run_hook(&hook, step.id(), "on_completed");
                self.completing.set(false);
            }
        }

        // The hook stopped or restarted the tour
        if self.epoch.get() != epoch {
            return;
        }

        self.advance_to(index + 1);
    }

    /// Step at the current index, if playing
    pub fn current_step(&self) -> Option<Rc<Step>> {
        self.state.get().index().and_then(|i| self.step_at(i))
    }

    /// Target at the current index, if playing and present
    pub fn current_target(&self) -> Option<TargetHandle> {
        let index = self.state.get().index()?;
        self.sequence.borrow().targets.get(index).cloned().flatten()
    }

    /// Current state
    pub fn state(&self) -> SequencerState {
        self.state.get()
    }

    /// Check if a sequence is active
    pub fn is_playing(&self) -> bool {
        self.state.get().is_playing()
    }

    /// Current index, `None` while idle
    pub fn current_index(&self) -> Option<usize> {
        self.state.get().index()
    }

    /// Number of steps in the stored sequence
    pub fn step_count(&self) -> usize {
        self.sequence.borrow().steps.len()
    }

    /// Stop and release the stored sequence
    pub fn dispose(&self) {
        self.stop();
        *self.sequence.borrow_mut() = Sequence::default();
    }

    fn start(&self, steps: Vec<Step>, targets: Vec<Option<TargetHandle>>) {
        if self.is_playing() {
            tracing::debug!("Restarting tour while playing; previous sequence discarded");
        }

        *self.sequence.borrow_mut() = Sequence {
            steps: steps.into_iter().map(Rc::new).collect(),
            targets,
        };

        tracing::info!("Tour started with {} step(s)", self.step_count());
        self.bump_epoch();
        self.advance_to(0);
    }

    fn advance_to(&self, index: usize) {
        let next = {
            let sequence = self.sequence.borrow();
            sequence
                .steps
                .get(index)
                .map(|step| (Rc::clone(step), sequence.targets[index].clone()))
        };

        let Some((step, target)) = next else {
            self.finish();
            return;
        };

        self.state.set(SequencerState::Playing(index));
        let epoch = self.bump_epoch();
        tracing::debug!("Tour step {} '{}' entered", index, step.id());

        if let Some(hook) = step.hooks().on_enter.clone() {
            run_hook(&hook, step.id(), "on_enter");
        }

        // The enter hook moved the sequencer on; this step is already stale
        if self.epoch.get() != epoch {
            return;
        }

        self.step_changed.emit(&StepChange { index, step, target });
    }

    fn finish(&self) {
        self.state.set(SequencerState::Idle);
        self.bump_epoch();
        tracing::info!("Tour stopped");
        self.stopped.emit(&());
    }

    fn step_at(&self, index: usize) -> Option<Rc<Step>> {
        self.sequence.borrow().steps.get(index).cloned()
    }

    fn bump_epoch(&self) -> u64 {
        let epoch = self.epoch.get().wrapping_add(1);
        self.epoch.set(epoch);
        epoch
    }
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a step hook, containing any panic so the transition still completes
fn run_hook(hook: &Hook, step_id: &str, which: &str) {
    if panic::catch_unwind(AssertUnwindSafe(|| hook())).is_err() {
        tracing::error!("Tour step '{}' {} hook panicked; continuing", step_id, which);
    }
}
