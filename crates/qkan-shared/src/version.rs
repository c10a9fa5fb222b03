//! Dotted schema versions and their ordering.
//!
//! Versions are stored in the project database as strings such as `"2.5.9"`.
//! Older releases wrote qualifiers like `"2.2c"`; only the leading digits of
//! each component take part in the comparison.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A `major.minor.patch` schema version.
///
/// Ordering is lexicographic over the triple. Parsing never fails:
/// - each component contributes its leading ASCII digits, anything after them
///   is a qualifier and is dropped;
/// - a component without leading digits, or one that overflows `u32`, is `0`;
/// - missing components are `0`, components after the third are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SchemaVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dotted version string. See the type docs for the rules.
    pub fn parse(s: &str) -> Self {
        let mut parts = [0u32; 3];
        for (slot, component) in parts.iter_mut().zip(s.trim().split('.')) {
            *slot = parse_component(component);
        }
        Self::new(parts[0], parts[1], parts[2])
    }

    /// `true` if `self` sorts strictly before `other`.
    pub fn is_older(&self, other: &SchemaVersion) -> bool {
        self.cmp(other) == Ordering::Less
    }
}

/// `true` if `a` is strictly older than `b`.
pub fn is_older(a: &SchemaVersion, b: &SchemaVersion) -> bool {
    a.is_older(b)
}

fn parse_component(component: &str) -> u32 {
    let component = component.trim();
    let digits = component
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(component, |(end, _)| &component[..end]);
    digits.parse().unwrap_or(0)
}

impl FromStr for SchemaVersion {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for SchemaVersion {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
