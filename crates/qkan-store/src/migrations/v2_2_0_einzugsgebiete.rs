//! v2.2.0 -- Population data for discharges and catchment areas.

use qkan_shared::SchemaVersion;

use super::shapes;
use super::step::{Action, MigrationStep, TableDef, TableShape};

pub(super) static STEP: MigrationStep = MigrationStep {
    version: SchemaVersion::new(2, 2, 0),
    description: "add inhabitants to einleit, create einzugsgebiete",
    destructive: false,
    actions: &[
        Action::AddColumns {
            table: "einleit",
            probe: "ew",
            columns: &["ew REAL", "einzugsgebiet TEXT"],
        },
        Action::CreateTable(TableDef {
            name: "einzugsgebiete",
            shape: TableShape {
                columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
                    tgnam TEXT,
                    ewdichte REAL,
                    wverbrauch REAL,
                    stdmittel REAL,
                    fremdwas REAL,
                    kommentar TEXT,
                    createdat TEXT DEFAULT CURRENT_DATE",
                geometry: shapes::AREA,
            },
            spatial_index: Some("geom"),
            seed: None,
        }),
    ],
};
