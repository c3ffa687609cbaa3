// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tour steps and their lifecycle hooks.

use std::fmt;
use std::rc::Rc;

/// Zero-argument lifecycle callback
pub type Hook = Rc<dyn Fn()>;

/// Optional callbacks attached to a step
#[derive(Clone, Default)]
pub struct StepHooks {
    /// Runs once when the step becomes current
    pub on_enter: Option<Hook>,
    /// Runs once when the step is completed, before advancing
    pub on_completed: Option<Hook>,
}

impl StepHooks {
    /// Hooks with nothing attached
    pub fn none() -> Self {
        Self::default()
    }
}

impl fmt::Debug for StepHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepHooks")
            .field("on_enter", &self.on_enter.is_some())
            .field("on_completed", &self.on_completed.is_some())
            .finish()
    }
}

/// One unit of the tour: highlight a target and show a description.
///
/// Steps are immutable once built; the sequencer only reads them.
#[derive(Debug, Clone)]
pub struct Step {
    id: String,
    description: String,
    hooks: StepHooks,
}

impl Step {
    /// Create a step without hooks
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            hooks: StepHooks::none(),
        }
    }

    /// Attach an enter hook
    pub fn on_enter(mut self, hook: impl Fn() + 'static) -> Self {
        self.hooks.on_enter = Some(Rc::new(hook));
        self
    }

    /// Attach a completion hook
    pub fn on_completed(mut self, hook: impl Fn() + 'static) -> Self {
        self.hooks.on_completed = Some(Rc::new(hook));
        self
    }

    /// Step identifier, unique within its sequence
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Text shown in the bubble (may be empty)
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Lifecycle hooks
    pub fn hooks(&self) -> &StepHooks {
        &self.hooks
    }
}
