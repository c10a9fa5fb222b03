//! v2.5.7 -- Runoff parameters move from `flaechen` to `linkfl`.
//!
//! Each area link carries its own runoff type, storage parameters and flow
//! times, copied from the linked area. `flaechen` then loses those columns.

use qkan_shared::SchemaVersion;

use super::shapes;
use super::step::{Action, MigrationStep, Rebuild, TableShape};

const LINKFL_OLD: TableShape = TableShape {
    columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
        flnam TEXT,
        haltnam TEXT,
        tezgnam TEXT,
        teilgebiet TEXT",
    geometry: shapes::LINKFL,
};

pub(super) const LINKFL_RUNOFF: TableShape = TableShape {
    columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
        flnam TEXT,
        haltnam TEXT,
        tezgnam TEXT,
        teilgebiet TEXT,
        abflusstyp TEXT,
        speicherzahl INTEGER,
        speicherkonst REAL,
        fliesszeitkanal REAL,
        fliesszeitflaeche REAL",
    geometry: shapes::LINKFL,
};

const FLAECHEN_SLIM: TableShape = TableShape {
    columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
        flnam TEXT,
        haltnam TEXT,
        neigkl INTEGER DEFAULT 0,
        teilgebiet TEXT,
        regenschreiber TEXT,
        abflussparameter TEXT,
        aufteilen TEXT DEFAULT 'nein',
        kommentar TEXT,
        createdat TEXT DEFAULT CURRENT_DATE",
    geometry: shapes::AREA,
};

pub(super) static STEP: MigrationStep = MigrationStep {
    version: SchemaVersion::new(2, 5, 7),
    description: "move runoff parameters to linkfl",
    destructive: true,
    actions: &[
        Action::Rebuild(Rebuild {
            table: "linkfl",
            shadow: LINKFL_OLD,
            target: LINKFL_RUNOFF,
            carry: &["pk", "flnam", "haltnam", "tezgnam", "teilgebiet", "geom", "gbuf", "glink"],
            spatial_index: Some("glink"),
        }),
        Action::Statements {
            label: "2.5.7 copy runoff parameters",
            sql: &["UPDATE linkfl SET
                    (abflusstyp, speicherzahl, speicherkonst, fliesszeitkanal, fliesszeitflaeche) =
                    (SELECT abflusstyp, speicherzahl, speicherkonst, fliesszeitkanal, fliesszeit
                     FROM flaechen
                     WHERE linkfl.flnam = flaechen.flnam)"],
        },
        Action::Rebuild(Rebuild {
            table: "flaechen",
            shadow: FLAECHEN_SLIM,
            target: FLAECHEN_SLIM,
            carry: &[
                "pk", "flnam", "haltnam", "neigkl", "teilgebiet", "regenschreiber",
                "abflussparameter", "aufteilen", "kommentar", "createdat", "geom",
            ],
            spatial_index: Some("geom"),
        }),
        Action::Milestone(75),
    ],
};
