//! Project schema as it stood before versioned upgrades existed.
//!
//! New templates start from this baseline and are brought to the current
//! version by the regular migration catalog, so a template and an upgraded
//! legacy project end up with the same schema.

use qkan_shared::constants::LEGACY_VERSION;

use crate::connection::SpatialConnection;
use crate::error::Result;
use crate::host::NoProgress;
use crate::migrations::step::{Action, TableDef, TableShape};
use crate::migrations::{apply_action, shapes};

static BASELINE: &[Action] = &[
    Action::CreateTable(TableDef {
        name: "info",
        shape: TableShape {
            columns: "subject TEXT, value TEXT",
            geometry: &[],
        },
        spatial_index: None,
        seed: None,
    }),
    Action::CreateTable(TableDef {
        name: "haltungen",
        shape: TableShape {
            columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
                haltnam TEXT,
                schoben TEXT,
                schunten TEXT,
                hoehe REAL,
                breite REAL,
                laenge REAL,
                sohleoben REAL,
                sohleunten REAL,
                deckeloben REAL,
                deckelunten REAL,
                teilgebiet TEXT,
                profilnam TEXT DEFAULT 'Kreisquerschnitt',
                entwart TEXT DEFAULT 'Regenwasser',
                ks REAL DEFAULT 1.5,
                simstatus TEXT DEFAULT 'vorhanden',
                kommentar TEXT,
                createdat TEXT DEFAULT CURRENT_DATE",
            geometry: shapes::REACH,
        },
        spatial_index: Some("geom"),
        seed: None,
    }),
    Action::CreateTable(TableDef {
        name: "schaechte",
        shape: TableShape {
            columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
                schnam TEXT,
                sohlhoehe REAL,
                deckelhoehe REAL,
                durchm REAL,
                druckdicht INTEGER,
                ueberstauflaeche REAL DEFAULT 0,
                entwart TEXT DEFAULT 'Regenwasser',
                strasse TEXT,
                teilgebiet TEXT,
                knotentyp TEXT,
                auslasstyp TEXT,
                schachttyp TEXT DEFAULT 'Schacht',
                simstatus TEXT DEFAULT 'vorhanden',
                kommentar TEXT,
                createdat TEXT DEFAULT CURRENT_DATE",
            geometry: shapes::POINT,
        },
        spatial_index: Some("geom"),
        seed: None,
    }),
    Action::CreateTable(TableDef {
        name: "flaechen",
        shape: TableShape {
            columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
                flnam TEXT,
                haltnam TEXT,
                neigkl INTEGER DEFAULT 0,
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
        },
        spatial_index: Some("geom"),
        seed: None,
    }),
    Action::CreateTable(TableDef {
        name: "linkfl",
        shape: TableShape {
            columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
                flnam TEXT,
                haltnam TEXT",
            geometry: shapes::LINKFL,
        },
        spatial_index: Some("geom"),
        seed: None,
    }),
    Action::CreateTable(TableDef {
        name: "tezg",
        shape: TableShape {
            columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
                flnam TEXT,
                haltnam TEXT,
                neigkl INTEGER DEFAULT 0,
                regenschreiber TEXT,
                teilgebiet TEXT,
                abflussparameter TEXT,
                kommentar TEXT,
                createdat TEXT DEFAULT CURRENT_DATE",
            geometry: shapes::AREA,
        },
        spatial_index: Some("geom"),
        seed: None,
    }),
    Action::CreateTable(TableDef {
        name: "profile",
        shape: TableShape {
            columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
                profilnam TEXT,
                he_nr INTEGER,
                mu_nr INTEGER",
            geometry: &[],
        },
        spatial_index: None,
        seed: Some(
            "INSERT INTO profile (profilnam, he_nr, mu_nr) VALUES
                ('Kreisquerschnitt', 1, 1),
                ('Rechteckquerschnitt', 3, 2),
                ('Eiquerschnitt', 5, 3)",
        ),
    }),
    Action::CreateTable(TableDef {
        name: "entwaesserungsarten",
        shape: TableShape {
            columns: "pk INTEGER PRIMARY KEY AUTOINCREMENT,
                bezeichnung TEXT,
                kuerzel TEXT,
                bemerkung TEXT,
                he_nr INTEGER",
            geometry: &[],
        },
        spatial_index: None,
        seed: Some(
            "INSERT INTO entwaesserungsarten (bezeichnung, kuerzel, bemerkung, he_nr) VALUES
                ('Mischwasser', 'MW', NULL, 0),
                ('Schmutzwasser', 'SW', NULL, 1),
                ('Regenwasser', 'RW', NULL, 2)",
        ),
    }),
];

/// Create the baseline tables in an open database.
///
/// Tables that already exist are left untouched. No version row is written,
/// so the result reads as a legacy project.
pub fn create_baseline(conn: &mut SpatialConnection) -> Result<()> {
    conn.ensure_spatial_metadata()?;
    tracing::info!(path = %conn.path().display(), "creating baseline schema");
    for action in BASELINE {
        apply_action(conn, LEGACY_VERSION, action, &NoProgress)?;
    }
    Ok(())
}
