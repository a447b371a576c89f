// Shared application state for the REST handlers.

use chrono::{DateTime, Utc};

use octomux_core::MatrixController;

/// State shared by all handlers. Cheap to clone; the controller is a
/// handle over shared internals.
#[derive(Clone)]
pub struct AppState {
    pub controller: MatrixController,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(controller: MatrixController) -> Self {
        Self {
            controller,
            started_at: Utc::now(),
        }
    }
}
