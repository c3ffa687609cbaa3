// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tour controller: owns the sequencer and presenter, ticks them per frame.

use crate::config::PresenterConfig;
use crate::error::ConfigurationError;
use crate::presenter::BindingPresenter;
use crate::sequencer::StepSequencer;
use crate::step::Step;
use crate::target::{TargetHandle, TargetResolver};
use crate::view::{ControlLocator, OverlayView};
use std::rc::Rc;

/// Owner of a tour's moving parts
pub struct TourController {
    sequencer: Rc<StepSequencer>,
    view: Rc<dyn OverlayView>,
    presenter: Option<BindingPresenter>,
}

impl TourController {
    /// Create a sequencer and attach a presenter to it
    pub fn initialize(
        view: Rc<dyn OverlayView>,
        locator: Rc<dyn ControlLocator>,
        config: PresenterConfig,
    ) -> Self {
        Self::with_sequencer(Rc::new(StepSequencer::new()), view, locator, config)
    }

    /// Attach a presenter to an existing sequencer
    pub fn with_sequencer(
        sequencer: Rc<StepSequencer>,
        view: Rc<dyn OverlayView>,
        locator: Rc<dyn ControlLocator>,
        config: PresenterConfig,
    ) -> Self {
        let presenter = BindingPresenter::attach(sequencer.clone(), view.clone(), locator, config);
        tracing::debug!("Tour controller initialized");
        Self {
            sequencer,
            view,
            presenter: Some(presenter),
        }
    }

    /// The sequencer
    pub fn sequencer(&self) -> &Rc<StepSequencer> {
        &self.sequencer
    }

    /// The presenter, until disposed
    pub fn presenter(&self) -> Option<&BindingPresenter> {
        self.presenter.as_ref()
    }

    /// Register the resolver for key-based play
    pub fn set_resolver(&self, resolver: Rc<dyn TargetResolver>) {
        self.sequencer.set_resolver(resolver);
    }

    /// Start a tour
    pub fn play(
        &self,
        steps: Vec<Step>,
        targets: Vec<Option<TargetHandle>>,
    ) -> Result<(), ConfigurationError> {
        self.sequencer.play(steps, targets)
    }

    /// Start a tour with targets looked up by key
    pub fn play_by_key<K: AsRef<str>>(
        &self,
        steps: Vec<Step>,
        keys: &[K],
    ) -> Result<(), ConfigurationError> {
        self.sequencer.play_by_key(steps, keys)
    }

    /// Stop the tour
    pub fn stop(&self) {
        self.sequencer.stop();
    }

    /// Per-frame update: realign the overlay, then advance view animation
    pub fn tick(&self, delta_time: f32) {
        if let Some(presenter) = &self.presenter {
            presenter.tick();
        }
        self.view.tick_animation(delta_time);
    }

    /// Check if the controller has not been disposed yet
    pub fn is_initialized(&self) -> bool {
        self.presenter.is_some()
    }

    /// Stop the tour and tear down the presenter. Safe to call twice.
    pub fn dispose(&mut self) {
        let Some(mut presenter) = self.presenter.take() else {
            return;
        };
        self.sequencer.stop();
        presenter.dispose();
        tracing::debug!("Tour controller disposed");
    }
}

impl Drop for TourController {
    fn drop(&mut self) {
        self.dispose();
    }
}
