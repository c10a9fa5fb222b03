//! Geometry column sets shared by several steps and the baseline schema.

use crate::spatial::GeometryKind;

use super::step::GeometryColumn;

/// Single area geometry (`flaechen`, `tezg`, `einzugsgebiete`, ...).
pub(crate) const AREA: &[GeometryColumn] = &[GeometryColumn::new("geom", GeometryKind::MultiPolygon)];

/// Single point geometry (`einleit`, `schaechte`).
pub(crate) const POINT: &[GeometryColumn] = &[GeometryColumn::new("geom", GeometryKind::Point)];

/// Sewer reach axis.
pub(crate) const REACH: &[GeometryColumn] = &[GeometryColumn::new("geom", GeometryKind::LineString)];

/// Link line only (`linkageb`).
pub(crate) const LINK_LINE: &[GeometryColumn] = &[GeometryColumn::new("glink", GeometryKind::LineString)];

/// Area links: area piece, buffer and link line.
pub(crate) const LINKFL: &[GeometryColumn] = &[
    GeometryColumn::new("geom", GeometryKind::MultiPolygon),
    GeometryColumn::new("gbuf", GeometryKind::MultiPolygon),
    GeometryColumn::new("glink", GeometryKind::LineString),
];

/// Discharge links. The link area is a plain polygon here.
pub(crate) const LINKSW: &[GeometryColumn] = &[
    GeometryColumn::new("geom", GeometryKind::Polygon),
    GeometryColumn::new("gbuf", GeometryKind::MultiPolygon),
    GeometryColumn::new("glink", GeometryKind::LineString),
];
