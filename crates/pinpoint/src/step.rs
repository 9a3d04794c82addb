use std::{fmt, sync::Arc};

use tokio::sync::watch;
use tracing::info;

/// Stage index in the linear report flow. Stages count from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormStep(u8);

impl FormStep {
    pub const FIRST: Self = Self(1);
    /// Stage that follows the location view in the report flow.
    pub const AFTER_LOCATION: Self = Self(3);

    /// Returns `None` for 0, which is not a stage.
    pub const fn new(index: u8) -> Option<Self> {
        if index == 0 { None } else { Some(Self(index)) }
    }

    pub const fn index(self) -> u8 {
        self.0
    }
}

impl Default for FormStep {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for FormStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owns the current [`FormStep`] of one report flow.
///
/// Search and map code never move the step; only the host UI does, through
/// [`confirm`](Self::confirm) or [`set_step`](Self::set_step).
#[derive(Debug, Clone)]
pub struct StepController {
    tx: Arc<watch::Sender<FormStep>>,
    confirm_target: FormStep,
}

impl StepController {
    /// A flow starting at [`FormStep::FIRST`], where `confirm` jumps to
    /// `confirm_target`.
    pub fn new(confirm_target: FormStep) -> Self {
        let (tx, _) = watch::channel(FormStep::FIRST);
        Self {
            tx: Arc::new(tx),
            confirm_target,
        }
    }

    pub fn current(&self) -> FormStep {
        *self.tx.borrow()
    }

    /// Move the flow to the confirm target.
    ///
    /// No check is made that a location was picked: confirming with the
    /// initial coordinate still advances.
    pub fn confirm(&self) -> FormStep {
        let from = self.current();
        self.tx.send_replace(self.confirm_target);
        info!(%from, to = %self.confirm_target, "Location confirmed");
        self.confirm_target
    }

    pub fn set_step(&self, step: FormStep) {
        self.tx.send_replace(step);
    }

    pub fn confirm_target(&self) -> FormStep {
        self.confirm_target
    }

    pub fn subscribe(&self) -> watch::Receiver<FormStep> {
        self.tx.subscribe()
    }
}

impl Default for StepController {
    fn default() -> Self {
        Self::new(FormStep::AFTER_LOCATION)
    }
}
