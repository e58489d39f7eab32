use std::collections::BTreeSet;

use super::grid::TableRow;
use super::model::{PenguinTable, Record, Species};
use crate::error::{DashError, DashResult};

/// Upper end of the mass slider; also the default ceiling.
pub const DEFAULT_MASS_CEILING: f64 = 6000.0;

// ---------------------------------------------------------------------------
// Filter predicate: selected species + body-mass ceiling
// ---------------------------------------------------------------------------

/// User-controlled filter parameters.
///
/// The default selects every species with the ceiling at the top of the
/// slider, which is what the sidebar shows on first paint.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub selected_species: BTreeSet<Species>,
    pub mass_ceiling: f64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            selected_species: Species::ALL.into_iter().collect(),
            mass_ceiling: DEFAULT_MASS_CEILING,
        }
    }
}

impl FilterState {
    pub fn new(selected_species: impl IntoIterator<Item = Species>, mass_ceiling: f64) -> Self {
        Self {
            selected_species: selected_species.into_iter().collect(),
            mass_ceiling,
        }
    }

    /// A record passes when its species is selected and its body mass is
    /// strictly below the ceiling. Missing mass never passes.
    pub fn matches(&self, record: &Record) -> bool {
        self.selected_species.contains(&record.species)
            && record
                .body_mass_g
                .is_some_and(|mass| mass < self.mass_ceiling)
    }
}

/// Return indices of records that pass the filter, in source order.
pub fn filtered_indices(table: &PenguinTable, filters: &FilterState) -> Vec<usize> {
    table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| filters.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Compute the filtered view of `table` under `filters`.
pub fn compute_view<'a>(table: &'a PenguinTable, filters: &FilterState) -> FilteredView<'a> {
    FilteredView::new(table, filtered_indices(table, filters))
}

// ---------------------------------------------------------------------------
// FilteredView – borrowed subset of the source table
// ---------------------------------------------------------------------------

/// Order-preserving subset of a [`PenguinTable`], held as row indices.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a PenguinTable,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Build a view from indices previously produced by [`filtered_indices`].
    pub fn new(table: &'a PenguinTable, indices: Vec<usize>) -> Self {
        Self { table, indices }
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.table.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn row_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn mean_bill_length(&self) -> DashResult<f64> {
        self.mean_of("bill_length_mm", |r| r.bill_length_mm)
    }

    pub fn mean_bill_depth(&self) -> DashResult<f64> {
        self.mean_of("bill_depth_mm", |r| r.bill_depth_mm)
    }

    /// Arithmetic mean over present values; missing cells are skipped.
    fn mean_of(&self, column: &'static str, field: impl Fn(&Record) -> Option<f64>) -> DashResult<f64> {
        let (sum, n) = self
            .records()
            .filter_map(|r| field(r))
            .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
        if n == 0 {
            return Err(DashError::EmptyView { column });
        }
        Ok(sum / n as f64)
    }

    /// Scatter points (bill length, bill depth) grouped by species.
    ///
    /// Only species with at least one plottable record are returned, in
    /// display order. Records lacking either coordinate are skipped.
    pub fn scatter_series(&self) -> Vec<(Species, Vec<[f64; 2]>)> {
        Species::ALL
            .iter()
            .filter_map(|&sp| {
                let points: Vec<[f64; 2]> = self
                    .records()
                    .filter(|r| r.species == sp)
                    .filter_map(|r| Some([r.bill_length_mm?, r.bill_depth_mm?]))
                    .collect();
                (!points.is_empty()).then_some((sp, points))
            })
            .collect()
    }

    /// The view projected onto the table columns.
    pub fn table_rows(&self) -> Vec<TableRow> {
        self.records().map(TableRow::from).collect()
    }
}
