//! v2.2.3 -- Rebuild of `flaechen`, `linksw`, `linkfl` and `einleit`.
//!
//! All four tables get their final column order for this release and their
//! geometry registrations are renewed. `linkfl` gains `teilgebiet` and its
//! spatial index moves to the link line. Afterwards `abflusstyp` is derived
//! from the legacy `he_typ` code.

use qkan_shared::SchemaVersion;

use super::shapes;
use super::step::{Action, MigrationStep, Rebuild, TableShape};

const FLAECHEN: TableShape = TableShape {
    columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
        flnam TEXT,
        haltnam TEXT,
        neigkl INTEGER DEFAULT 0,
        abflusstyp TEXT,
        he_typ INTEGER DEFAULT 0,
        speicherzahl INTEGER DEFAULT 2,
        speicherkonst REAL,
        fliesszeit REAL,
        fliesszeitkanal REAL,
        teilgebiet TEXT,
        regenschreiber TEXT,
        abflussparameter TEXT,
        aufteilen TEXT DEFAULT 'nein',
        kommentar TEXT,
        createdat TEXT DEFAULT CURRENT_DATE",
    geometry: shapes::AREA,
};

const LINKSW: TableShape = TableShape {
    columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
        elnam TEXT,
        haltnam TEXT,
        teilgebiet TEXT",
    geometry: shapes::LINKSW,
};

const LINKFL_OLD: TableShape = TableShape {
    columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
        flnam TEXT,
        haltnam TEXT,
        tezgnam TEXT",
    geometry: shapes::LINKFL,
};

const LINKFL_NEW: TableShape = TableShape {
    columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
        flnam TEXT,
        haltnam TEXT,
        tezgnam TEXT,
        teilgebiet TEXT",
    geometry: shapes::LINKFL,
};

const EINLEIT: TableShape = TableShape {
    columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
        elnam TEXT,
        haltnam TEXT,
        teilgebiet TEXT,
        zufluss REAL,
        ew REAL,
        einzugsgebiet TEXT,
        kommentar TEXT,
        createdat TEXT DEFAULT CURRENT_DATE",
    geometry: shapes::POINT,
};

pub(super) static STEP: MigrationStep = MigrationStep {
    version: SchemaVersion::new(2, 2, 3),
    description: "rebuild flaechen, linksw, linkfl and einleit",
    destructive: true,
    actions: &[
        Action::Rebuild(Rebuild {
            table: "flaechen",
            shadow: FLAECHEN,
            target: FLAECHEN,
            carry: &[
                "pk", "flnam", "haltnam", "neigkl", "abflusstyp", "he_typ", "speicherzahl",
                "speicherkonst", "fliesszeit", "fliesszeitkanal", "teilgebiet", "regenschreiber",
                "abflussparameter", "aufteilen", "kommentar", "createdat", "geom",
            ],
            spatial_index: Some("geom"),
        }),
        Action::Statements {
            label: "2.2.3 derive flaechen.abflusstyp",
            sql: &["UPDATE flaechen SET abflusstyp =
                    CASE he_typ
                        WHEN 0 THEN 'Direktabfluss'
                        WHEN 1 THEN 'Fließzeiten'
                        WHEN 2 THEN 'Schwerpunktfließzeit'
                        ELSE NULL END
                    WHERE abflusstyp IS NULL"],
        },
        Action::Milestone(15),
        Action::Rebuild(Rebuild {
            table: "linksw",
            shadow: LINKSW,
            target: LINKSW,
            carry: &["pk", "elnam", "haltnam", "teilgebiet", "geom", "gbuf", "glink"],
            spatial_index: Some("geom"),
        }),
        Action::Milestone(30),
        Action::Rebuild(Rebuild {
            table: "linkfl",
            shadow: LINKFL_OLD,
            target: LINKFL_NEW,
            carry: &["pk", "flnam", "haltnam", "tezgnam", "geom", "gbuf", "glink"],
            spatial_index: Some("glink"),
        }),
        Action::Milestone(45),
        Action::Rebuild(Rebuild {
            table: "einleit",
            shadow: EINLEIT,
            target: EINLEIT,
            carry: &[
                "pk", "elnam", "haltnam", "teilgebiet", "zufluss", "ew", "einzugsgebiet",
                "kommentar", "createdat", "geom",
            ],
            spatial_index: Some("geom"),
        }),
        Action::Milestone(60),
    ],
};
