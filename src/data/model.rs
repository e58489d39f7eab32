use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Species – the categorical column used by the species filter
// ---------------------------------------------------------------------------

/// Penguin species found in the Palmer Archipelago data.
/// Declaration order is display order (and `Ord`), so `BTreeSet<Species>`
/// iterates Adelie, Gentoo, Chinstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Species {
    Adelie,
    Gentoo,
    Chinstrap,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Adelie, Species::Gentoo, Species::Chinstrap];

    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Adelie => "Adelie",
            Species::Gentoo => "Gentoo",
            Species::Chinstrap => "Chinstrap",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Adelie" => Ok(Species::Adelie),
            "Gentoo" => Ok(Species::Gentoo),
            "Chinstrap" => Ok(Species::Chinstrap),
            other => bail!("unknown species '{other}'"),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the penguin table
// ---------------------------------------------------------------------------

/// A single penguin observation.
///
/// Measurements are optional because the published dataset contains `NA`
/// cells. `flipper_length_mm`, `sex` and `year` are carried along from the
/// source file but no computation reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub species: Species,
    pub island: String,
    pub bill_length_mm: Option<f64>,
    pub bill_depth_mm: Option<f64>,
    pub flipper_length_mm: Option<f64>,
    pub body_mass_g: Option<f64>,
    pub sex: Option<String>,
    pub year: Option<i64>,
}

impl Record {
    /// Record with only the columns the dashboard uses.
    pub fn new(
        species: Species,
        island: impl Into<String>,
        bill_length_mm: Option<f64>,
        bill_depth_mm: Option<f64>,
        body_mass_g: Option<f64>,
    ) -> Self {
        Record {
            species,
            island: island.into(),
            bill_length_mm,
            bill_depth_mm,
            flipper_length_mm: None,
            body_mass_g,
            sex: None,
            year: None,
        }
    }

    /// True when any of the three measurements the dashboard reads is missing.
    pub fn has_missing_measurement(&self) -> bool {
        self.bill_length_mm.is_none() || self.bill_depth_mm.is_none() || self.body_mass_g.is_none()
    }
}

// ---------------------------------------------------------------------------
// PenguinTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The source table. Built once by the loader and only ever read afterwards.
#[derive(Debug, Clone, Default)]
pub struct PenguinTable {
    records: Vec<Record>,
}

impl PenguinTable {
    pub fn from_records(records: Vec<Record>) -> Self {
        PenguinTable { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count of records with at least one missing measurement.
    pub fn incomplete_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.has_missing_measurement())
            .count()
    }

    /// Number of records per species, in display order.
    pub fn species_counts(&self) -> Vec<(Species, usize)> {
        Species::ALL
            .iter()
            .map(|&sp| (sp, self.records.iter().filter(|r| r.species == sp).count()))
            .collect()
    }
}
