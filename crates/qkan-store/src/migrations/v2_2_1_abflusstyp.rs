//! v2.2.1 -- Runoff type on areas.

use qkan_shared::SchemaVersion;

use super::step::{Action, MigrationStep};

pub(super) const ADD_ABFLUSSTYP: Action = Action::AddColumns {
    table: "flaechen",
    probe: "abflusstyp",
    columns: &["abflusstyp TEXT"],
};

pub(super) static STEP: MigrationStep = MigrationStep {
    version: SchemaVersion::new(2, 2, 1),
    description: "add flaechen.abflusstyp",
    destructive: false,
    actions: &[ADD_ABFLUSSTYP],
};

/// Released twice; the repeat catches databases that skipped 2.2.1.
pub(super) static STEP_REPEAT: MigrationStep = MigrationStep {
    version: SchemaVersion::new(2, 2, 2),
    description: "add flaechen.abflusstyp (repeat)",
    destructive: false,
    actions: &[ADD_ABFLUSSTYP],
};
