//! v2.0.2 -- Direct discharges.
//!
//! Adds `einleit` (point discharges into the network) and `linksw`, which
//! connects each discharge to its sewer reach.

use qkan_shared::SchemaVersion;

use super::shapes;
use super::step::{Action, MigrationStep, TableDef, TableShape};

pub(super) static STEP: MigrationStep = MigrationStep {
    version: SchemaVersion::new(2, 0, 2),
    description: "add direct discharges and their links",
    destructive: false,
    actions: &[
        Action::CreateTable(TableDef {
            name: "einleit",
            shape: TableShape {
                columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
                    elnam TEXT,
                    haltnam TEXT,
                    teilgebiet TEXT,
                    zufluss REAL,
                    kommentar TEXT,
                    createdat TEXT DEFAULT CURRENT_DATE",
                geometry: shapes::POINT,
            },
            spatial_index: Some("geom"),
            seed: None,
        }),
        Action::CreateTable(TableDef {
            name: "linksw",
            shape: TableShape {
                columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
                    elnam TEXT,
                    haltnam TEXT,
                    teilgebiet TEXT",
                geometry: shapes::LINKSW,
            },
            spatial_index: Some("geom"),
            seed: None,
        }),
    ],
};
