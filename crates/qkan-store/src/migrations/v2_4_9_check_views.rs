//! v2.4.9 -- Plausibility views for area links.

use qkan_shared::SchemaVersion;

use super::step::{Action, MigrationStep};

const V_LINKFL_CHECK: &str = r#"CREATE VIEW IF NOT EXISTS "v_linkfl_check" AS
    WITH lfok AS
    (   SELECT
            lf.pk AS "pk",
            lf.flnam AS "linkfl_nam",
            lf.haltnam AS "linkfl_haltnam",
            fl.flnam AS "flaech_nam",
            tg.flnam AS "tezg_nam",
            min(lf.pk) AS pkmin,
            max(lf.pk) AS pkmax,
            count(*) AS anzahl
        FROM linkfl AS lf
        LEFT JOIN flaechen AS fl
        ON lf.flnam = fl.flnam
        LEFT JOIN tezg AS tg
        ON lf.tezgnam = tg.flnam
        WHERE fl.aufteilen = 'ja' AND fl.aufteilen IS NOT NULL
        GROUP BY fl.flnam, tg.flnam
        UNION
        SELECT
            lf.pk AS "pk",
            lf.flnam AS "linkfl_nam",
            lf.haltnam AS "linkfl_haltnam",
            fl.flnam AS "flaech_nam",
            NULL AS "tezg_nam",
            min(lf.pk) AS pkmin,
            max(lf.pk) AS pkmax,
            count(*) AS anzahl
        FROM linkfl AS lf
        LEFT JOIN flaechen AS fl
        ON lf.flnam = fl.flnam
        WHERE fl.aufteilen <> 'ja' OR fl.aufteilen IS NULL
        GROUP BY fl.flnam)
    SELECT pk, anzahl,
        CASE WHEN anzahl > 1 THEN 'mehrfach vorhanden'
             WHEN flaech_nam IS NULL THEN 'Keine Fläche'
             WHEN linkfl_haltnam IS NULL THEN 'Keine Haltung'
             ELSE 'o.k.' END AS fehler
    FROM lfok"#;

const V_FLAECHEN_OHNE_LINKFL: &str = r#"CREATE VIEW IF NOT EXISTS "v_flaechen_ohne_linkfl" AS
    SELECT
        fl.pk,
        fl.flnam AS "flaech_nam",
        fl.aufteilen AS "flaech_aufteilen",
        'Verbindung fehlt' AS "Fehler"
    FROM flaechen AS fl
    LEFT JOIN linkfl AS lf
    ON lf.flnam = fl.flnam
    LEFT JOIN tezg AS tg
    ON tg.flnam = lf.tezgnam
    WHERE ((fl.aufteilen <> 'ja' OR fl.aufteilen IS NULL) AND lf.pk IS NULL)
       OR (fl.aufteilen = 'ja' AND fl.aufteilen IS NOT NULL AND lf.pk IS NULL)
    UNION
    VALUES (0, '', '', 'o.k.')"#;

pub(super) static STEP: MigrationStep = MigrationStep {
    version: SchemaVersion::new(2, 4, 9),
    description: "create area link check views",
    destructive: false,
    actions: &[Action::Statements {
        label: "2.4.9 check views",
        sql: &[
            r#"DROP VIEW IF EXISTS "v_linkfl_check""#,
            V_LINKFL_CHECK,
            r#"DROP VIEW IF EXISTS "v_flaechen_ohne_linkfl""#,
            V_FLAECHEN_OHNE_LINKFL,
        ],
    }],
};
