// ── Batch preset application ──
//
// Each mapping entry resolves and applies independently; one bad entry
// never blocks the rest. The device has no transaction mechanism, so
// partial application is an accepted outcome, reported per entry.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::controller::MatrixController;
use crate::model::PortId;

/// Result of a batch preset application.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PresetOutcome {
    /// Successfully applied mappings (output -> input).
    pub applied: BTreeMap<u8, u8>,
    /// Failed mappings with error messages, keyed by the output
    /// identifier exactly as the caller supplied it.
    pub failed: BTreeMap<String, String>,
}

impl PresetOutcome {
    /// `true` when every entry applied.
    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl MatrixController {
    /// Apply a batch of output -> input mappings.
    ///
    /// Names are fetched once for the whole batch. Entries are attempted
    /// in the order supplied; any failure (invalid port, unresolved
    /// name, transport error) is captured as a per-entry message and
    /// does not stop later entries.
    pub async fn apply_presets(&self, mappings: &[(PortId, PortId)]) -> PresetOutcome {
        let input_names = self.input_names().await;
        let output_names = self.output_names().await;

        let mut outcome = PresetOutcome::default();

        for (output_id, input_id) in mappings {
            match self
                .route_resolved(input_id, output_id, &input_names, &output_names)
                .await
            {
                Ok(route) => {
                    outcome.applied.insert(route.output, route.input);
                }
                Err(err) => {
                    outcome.failed.insert(output_id.to_string(), err.to_string());
                }
            }
        }

        debug!(
            applied = outcome.applied.len(),
            failed = outcome.failed.len(),
            "preset application finished"
        );
        outcome
    }
}
