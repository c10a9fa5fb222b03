//! v2.2.16 -- Export support for the DYNA format.
//!
//! `dynahal` maps reaches to DYNA numbering; `profile.kp_key` and
//! `entwaesserungsarten.kp_nr` hold the DYNA codes.

use qkan_shared::SchemaVersion;

use super::step::{Action, MigrationStep, TableDef, TableShape};

pub(super) static STEP: MigrationStep = MigrationStep {
    version: SchemaVersion::new(2, 2, 16),
    description: "add dynahal and DYNA code columns",
    destructive: false,
    actions: &[
        Action::CreateTable(TableDef {
            name: "dynahal",
            shape: TableShape {
                columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
                    haltnam TEXT,
                    schoben TEXT,
                    schunten TEXT,
                    teilgebiet TEXT,
                    kanalnummer TEXT,
                    haltungsnummer TEXT,
                    anzobob INTEGER,
                    anzobun INTEGER,
                    anzunun INTEGER,
                    anzunob INTEGER",
                geometry: &[],
            },
            spatial_index: None,
            seed: None,
        }),
        Action::AddColumns {
            table: "profile",
            probe: "kp_key",
            columns: &["kp_key TEXT"],
        },
        Action::AddColumns {
            table: "entwaesserungsarten",
            probe: "kp_nr",
            columns: &["kp_nr INTEGER"],
        },
        Action::Statements {
            label: "2.2.16 DYNA drainage codes",
            sql: &[
                "UPDATE entwaesserungsarten SET kp_nr = 0 WHERE bezeichnung = 'Mischwasser'",
                "UPDATE entwaesserungsarten SET kp_nr = 1 WHERE bezeichnung = 'Schmutzwasser'",
                "UPDATE entwaesserungsarten SET kp_nr = 2 WHERE bezeichnung = 'Regenwasser'",
            ],
        },
    ],
};
