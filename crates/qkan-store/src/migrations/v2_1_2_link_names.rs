//! v2.1.2 -- Name columns on the link tables.

use qkan_shared::SchemaVersion;

use super::step::{Action, MigrationStep};

pub(super) static STEP: MigrationStep = MigrationStep {
    version: SchemaVersion::new(2, 1, 2),
    description: "add linksw.elnam and linkfl.tezgnam",
    destructive: false,
    actions: &[
        Action::AddColumns {
            table: "linksw",
            probe: "elnam",
            columns: &["elnam TEXT"],
        },
        Action::AddColumns {
            table: "linkfl",
            probe: "tezgnam",
            columns: &["tezgnam TEXT"],
        },
    ],
};
