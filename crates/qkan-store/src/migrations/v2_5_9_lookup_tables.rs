//! v2.5.9 -- Lookup tables for runoff, node and manhole types.

use qkan_shared::SchemaVersion;

use super::step::{Action, MigrationStep, TableDef, TableShape};

pub(super) static STEP: MigrationStep = MigrationStep {
    version: SchemaVersion::new(2, 5, 9),
    description: "add abflusstypen, knotentypen and schachttypen",
    destructive: false,
    actions: &[
        Action::CreateTable(TableDef {
            name: "abflusstypen",
            shape: TableShape {
                columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT, abflusstyp TEXT",
                geometry: &[],
            },
            spatial_index: None,
            seed: Some(
                "INSERT INTO abflusstypen (abflusstyp) VALUES
                    ('Fliesszeiten'),
                    ('Schwerpunktlaufzeit'),
                    ('Speicherkaskade')",
            ),
        }),
        Action::CreateTable(TableDef {
            name: "knotentypen",
            shape: TableShape {
                columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT, knotentyp TEXT",
                geometry: &[],
            },
            spatial_index: None,
            seed: Some(
                "INSERT INTO knotentypen (knotentyp) VALUES
                    ('Anfangsschacht'),
                    ('Einzelschacht'),
                    ('Endschacht'),
                    ('Hochpunkt'),
                    ('Normalschacht'),
                    ('Tiefpunkt'),
                    ('Verzweigung'),
                    ('Fliesszeiten')",
            ),
        }),
        Action::CreateTable(TableDef {
            name: "schachttypen",
            shape: TableShape {
                columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT, schachttyp TEXT",
                geometry: &[],
            },
            spatial_index: None,
            seed: Some(
                "INSERT INTO schachttypen (schachttyp) VALUES
                    ('Auslass'),
                    ('Schacht'),
                    ('Speicher')",
            ),
        }),
        Action::Milestone(100),
    ],
};
