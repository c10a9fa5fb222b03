//! v2.5.8 -- Renewed registration of `linkfl` and `linksw`.
//!
//! Both link tables are rebuilt in their current shape so their geometry
//! registrations and spatial indexes match what the map layers expect.

use qkan_shared::SchemaVersion;

use super::shapes;
use super::step::{Action, MigrationStep, Rebuild, TableShape};
use super::v2_5_7_linkfl_runoff::LINKFL_RUNOFF;

const LINKSW: TableShape = TableShape {
    columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
        elnam TEXT,
        haltnam TEXT,
        teilgebiet TEXT",
    geometry: shapes::LINKSW,
};

pub(super) static STEP: MigrationStep = MigrationStep {
    version: SchemaVersion::new(2, 5, 8),
    description: "rebuild linkfl and linksw",
    destructive: true,
    actions: &[
        Action::Rebuild(Rebuild {
            table: "linkfl",
            shadow: LINKFL_RUNOFF,
            target: LINKFL_RUNOFF,
            carry: &[
                "pk", "flnam", "haltnam", "tezgnam", "teilgebiet", "abflusstyp", "speicherzahl",
                "speicherkonst", "fliesszeitkanal", "fliesszeitflaeche", "geom", "gbuf", "glink",
            ],
            spatial_index: Some("glink"),
        }),
        Action::Rebuild(Rebuild {
            table: "linksw",
            shadow: LINKSW,
            target: LINKSW,
            carry: &["pk", "elnam", "haltnam", "teilgebiet", "geom", "gbuf", "glink"],
            spatial_index: Some("geom"),
        }),
        Action::Milestone(90),
    ],
};
