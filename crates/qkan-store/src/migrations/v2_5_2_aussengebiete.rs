//! v2.5.2 -- Outer catchments draining into manholes.

use qkan_shared::SchemaVersion;

use super::shapes;
use super::step::{Action, MigrationStep, TableDef, TableShape};

pub(super) static STEP: MigrationStep = MigrationStep {
    version: SchemaVersion::new(2, 5, 2),
    description: "add aussengebiete and linkageb",
    destructive: false,
    actions: &[
        Action::CreateTable(TableDef {
            name: "aussengebiete",
            shape: TableShape {
                columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
                    gebnam TEXT,
                    schnam TEXT,
                    hoeheob REAL,
                    hoeheun REAL,
                    fliessweg REAL,
                    basisabfluss REAL,
                    cn REAL,
                    regenschreiber TEXT,
                    teilgebiet TEXT,
                    kommentar TEXT,
                    createdat TEXT DEFAULT CURRENT_DATE",
                geometry: shapes::AREA,
            },
            spatial_index: Some("geom"),
            seed: None,
        }),
        Action::CreateTable(TableDef {
            name: "linkageb",
            shape: TableShape {
                columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
                    gebnam TEXT,
                    schnam TEXT",
                geometry: shapes::LINK_LINE,
            },
            spatial_index: Some("glink"),
            seed: None,
        }),
    ],
};
