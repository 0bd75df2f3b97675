// Navigation capability injected into the session manager

use std::sync::Mutex;

/// Route unauthenticated users are sent to after logout
pub const LOGIN_ROUTE: &str = "/login";

/// Redirects the caller's navigation context
pub trait Navigator: Send + Sync {
    fn redirect(&self, route: &str);
}

/// Any `Fn(&str)` closure can act as a navigator
impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn redirect(&self, route: &str) {
        self(route)
    }
}

/// Navigator that only records the routes it was asked to visit
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes visited so far, oldest first
    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .map(|routes| routes.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, route: &str) {
        tracing::debug!(route, "Redirecting");
        match self.visited.lock() {
            Ok(mut routes) => routes.push(route.to_string()),
            Err(poisoned) => poisoned.into_inner().push(route.to_string()),
        }
    }
}
