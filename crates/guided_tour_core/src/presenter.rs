// SPDX-License-Identifier: MIT OR Apache-2.0
//! Binding presenter.
//!
//! Connects the [`StepSequencer`] to an [`OverlayView`]:
//! - Shows the overlay for every new step
//! - Binds the step's activatable control, or arms the view's hit-test fallback
//! - Keeps the overlay aligned with its target on every tick
//! - Tears everything down on stop
//!
//! Exactly one input binding (control or fallback) is armed while the
//! sequencer is playing with a live target, and none otherwise.

use crate::config::{MissingTargetPolicy, PresenterConfig};
use crate::sequencer::{StepChange, StepSequencer};
use crate::signal::SubscriptionId;
use crate::target::{is_live, TargetHandle};
use crate::view::{ControlHandle, ControlLocator, OverlayView};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Which input source currently advances the tour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Nothing armed
    None,
    /// A discovered control's activation signal
    Control,
    /// The view's hit-test fallback
    Fallback,
}

enum Binding {
    None,
    Control {
        control: ControlHandle,
        subscription: SubscriptionId,
    },
    Fallback,
}

impl Binding {
    fn kind(&self) -> BindingKind {
        match self {
            Binding::None => BindingKind::None,
            Binding::Control { .. } => BindingKind::Control,
            Binding::Fallback => BindingKind::Fallback,
        }
    }
}

struct PresenterInner {
    sequencer: Rc<StepSequencer>,
    view: Rc<dyn OverlayView>,
    locator: Rc<dyn ControlLocator>,
    config: PresenterConfig,
    current_target: RefCell<Option<TargetHandle>>,
    binding: RefCell<Binding>,
}

struct Subscriptions {
    step_changed: SubscriptionId,
    stopped: SubscriptionId,
    target_activated: SubscriptionId,
}

/// Orchestrates the sequencer, the view and the active input binding
pub struct BindingPresenter {
    inner: Rc<PresenterInner>,
    subscriptions: Option<Subscriptions>,
}

impl BindingPresenter {
    /// Create a presenter and subscribe it to the sequencer and the view.
    ///
    /// Attach before the first `play`; a step already showing is not picked up.
    pub fn attach(
        sequencer: Rc<StepSequencer>,
        view: Rc<dyn OverlayView>,
        locator: Rc<dyn ControlLocator>,
        config: PresenterConfig,
    ) -> Self {
        let inner = Rc::new(PresenterInner {
            sequencer,
            view,
            locator,
            config,
            current_target: RefCell::new(None),
            binding: RefCell::new(Binding::None),
        });

        let weak = Rc::downgrade(&inner);
        let step_changed = inner.sequencer.step_changed().connect(move |change| {
            if let Some(inner) = weak.upgrade() {
                inner.on_step_changed(change);
            }
        });

        let weak = Rc::downgrade(&inner);
        let stopped = inner.sequencer.stopped().connect(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.on_stopped();
            }
        });

        let weak = Rc::downgrade(&inner);
        let target_activated = inner.view.target_activated().connect(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.on_fallback_clicked();
            }
        });

        Self {
            inner,
            subscriptions: Some(Subscriptions {
                step_changed,
                stopped,
                target_activated,
            }),
        }
    }

    /// Keep the overlay aligned with the current target. Call once per frame.
    pub fn tick(&self) {
        if !self.inner.sequencer.is_playing() {
            return;
        }
        let target = self.inner.current_target.borrow().clone();
        if let Some(target) = target {
            self.inner.view.sync_to_target(&target);
        }
    }

    /// Which input source is armed
    pub fn active_binding(&self) -> BindingKind {
        self.inner.binding.borrow().kind()
    }

    /// Target currently highlighted
    pub fn current_target(&self) -> Option<TargetHandle> {
        self.inner.current_target.borrow().clone()
    }

    /// Unbind the active control and drop every subscription. Safe to call twice.
    pub fn dispose(&mut self) {
        let Some(subs) = self.subscriptions.take() else {
            return;
        };

        self.inner.unbind();
        self.inner.sequencer.step_changed().disconnect(subs.step_changed);
        self.inner.sequencer.stopped().disconnect(subs.stopped);
        self.inner.view.target_activated().disconnect(subs.target_activated);
        tracing::debug!("Tour presenter disposed");
    }

    /// Whether [`Self::dispose`] has run
    pub fn is_disposed(&self) -> bool {
        self.subscriptions.is_none()
    }
}

impl Drop for BindingPresenter {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl PresenterInner {
    fn on_step_changed(self: &Rc<Self>, change: &StepChange) {
        let step = &change.step;
        *self.current_target.borrow_mut() = change.target.clone();

        if !is_live(change.target.as_ref()) {
            match self.config.missing_target {
                MissingTargetPolicy::AutoStop => {
                    tracing::warn!("Tour target missing or inactive at step '{}'; stopping tour", step.id());
                    self.sequencer.stop();
                }
                MissingTargetPolicy::Continue => {
                    tracing::warn!("Tour target missing or inactive at step '{}'; showing without highlight", step.id());
                    *self.current_target.borrow_mut() = None;
                    self.view.show(step.description(), None);
                    self.unbind();
                    self.view.set_fallback_click(false);
                }
            }
            return;
        }

        let Some(target) = change.target.clone() else {
            return;
        };

        self.view.show(step.description(), Some(&target));
        self.unbind();

        match self.locator.find_control(&target) {
            Some(control) => {
                self.view.set_fallback_click(false);
                let weak: Weak<Self> = Rc::downgrade(self);
                let subscription = control.activated().connect(move |_| {
                    if let Some(inner) = weak.upgrade() {
                        inner.sequencer.complete_current_and_advance();
                    }
                });
                tracing::debug!("Step '{}' bound to control '{}'", step.id(), control.label());
                *self.binding.borrow_mut() = Binding::Control { control, subscription };
            }
            None => {
                tracing::warn!("Step '{}' target has no activatable control; using hole click", step.id());
                self.view.set_fallback_click(true);
                *self.binding.borrow_mut() = Binding::Fallback;
            }
        }
    }

    fn on_stopped(&self) {
        self.unbind();
        *self.current_target.borrow_mut() = None;
        self.view.hide();
        self.view.set_fallback_click(false);
    }

    fn on_fallback_clicked(&self) {
        // A bound control owns activation; ignore stray hole clicks
        if self.binding.borrow().kind() != BindingKind::Fallback {
            return;
        }
        self.sequencer.complete_current_and_advance();
    }

    fn unbind(&self) {
        let previous = std::mem::replace(&mut *self.binding.borrow_mut(), Binding::None);
        if let Binding::Control { control, subscription } = previous {
            control.activated().disconnect(subscription);
        }
    }
}
