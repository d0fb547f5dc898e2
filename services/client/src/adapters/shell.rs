//! services/client/src/adapters/shell.rs
//!
//! Headless implementations of the UI-shell ports. Toasts and navigation are
//! written to the log; confirmations are answered with a fixed choice.

use ridetribe_core::domain::Route;
use ridetribe_core::ports::{Confirmer, Navigator, Toast, ToastLevel, Toaster};
use std::sync::{Mutex, PoisonError};
use tracing::{error, info};

/// Logs every toast through `tracing`.
#[derive(Clone, Copy, Default)]
pub struct TracingToaster;

impl Toaster for TracingToaster {
    fn show(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Success => info!(title = %toast.title, "{}", toast.message),
            ToastLevel::Error => error!(title = %toast.title, "{}", toast.message),
        }
    }
}

/// Records the current route and logs each transition.
#[derive(Default)]
pub struct TracingNavigator {
    current: Mutex<Option<Route>>,
}

impl TracingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Route> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for TracingNavigator {
    fn navigate(&self, route: Route) {
        info!(path = route.path(), "Navigating");
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(route);
    }
}

/// Answers every confirmation prompt the same way.
#[derive(Clone, Copy)]
pub struct FixedConfirmer {
    answer: bool,
}

impl FixedConfirmer {
    pub fn new(answer: bool) -> Self {
        Self { answer }
    }
}

impl Confirmer for FixedConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        info!(answer = self.answer, "{}", prompt);
        self.answer
    }
}
