use crate::color::ColorMap;
use crate::config::{DashConfig, DatasetSource};
use crate::data::filter::{FilterState, FilteredView, compute_view};
use crate::data::grid::{GridFilters, GridSort};
use crate::data::model::{PenguinTable, Species};
use crate::error::DashResult;

// ---------------------------------------------------------------------------
// Summary values shown in the value boxes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean_bill_length: DashResult<f64>,
    pub mean_bill_depth: DashResult<f64>,
}

/// `"43.9 mm"`, or `"No data"` when the view has nothing to average.
pub fn format_mm(value: &DashResult<f64>) -> String {
    match value {
        Ok(v) => format!("{v:.1} mm"),
        Err(_) => "No data".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Source table; replaced only by File → Open.
    pub table: PenguinTable,

    /// Where `table` came from, for the top bar.
    pub source: DatasetSource,

    /// Sidebar filter selections.
    pub filters: FilterState,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Slider domain and default ceiling.
    pub mass_range: (f64, f64),
    pub default_mass_ceiling: f64,

    pub color_map: ColorMap,

    /// Data grid column filters and sort; affect the table only.
    pub grid_filters: GridFilters,
    pub grid_sort: Option<GridSort>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(table: PenguinTable, source: DatasetSource, config: &DashConfig) -> Self {
        let mut state = Self {
            table: PenguinTable::default(),
            source: DatasetSource::Bundled,
            filters: FilterState::default(),
            visible_indices: Vec::new(),
            mass_range: (config.mass_min, config.mass_max),
            default_mass_ceiling: config.default_mass_ceiling,
            color_map: ColorMap::default(),
            grid_filters: GridFilters::default(),
            grid_sort: None,
            status_message: None,
        };
        state.set_table(table, source);
        state
    }

    /// Ingest a newly loaded table and reset every filter to its default.
    pub fn set_table(&mut self, table: PenguinTable, source: DatasetSource) {
        let incomplete = table.incomplete_count();
        if incomplete > 0 {
            log::warn!("{incomplete} of {} records have missing measurements", table.len());
        }
        self.table = table;
        self.source = source;
        self.filters = FilterState::new(Species::ALL, self.default_mass_ceiling);
        self.grid_filters.clear();
        self.grid_sort = None;
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` after filter change.
    pub fn refilter(&mut self) {
        self.visible_indices = compute_view(&self.table, &self.filters).into_indices();
        log::debug!(
            "view recomputed: species={:?} ceiling={} rows={}",
            self.filters.selected_species,
            self.filters.mass_ceiling,
            self.visible_indices.len()
        );
    }

    /// The current filtered view, built from the cached indices.
    pub fn view(&self) -> FilteredView<'_> {
        FilteredView::new(&self.table, self.visible_indices.clone())
    }

    pub fn summary(&self) -> Summary {
        let view = self.view();
        Summary {
            count: view.row_count(),
            mean_bill_length: view.mean_bill_length(),
            mean_bill_depth: view.mean_bill_depth(),
        }
    }

    pub fn set_mass_ceiling(&mut self, ceiling: f64) {
        if ceiling != self.filters.mass_ceiling {
            self.filters.mass_ceiling = ceiling;
            self.refilter();
        }
    }

    pub fn set_species_selected(&mut self, species: Species, selected: bool) {
        let changed = if selected {
            self.filters.selected_species.insert(species)
        } else {
            self.filters.selected_species.remove(&species)
        };
        if changed {
            self.refilter();
        }
    }

    /// Toggle a single species in the filter.
    pub fn toggle_species(&mut self, species: Species) {
        let selected = self.filters.selected_species.contains(&species);
        self.set_species_selected(species, !selected);
    }

    pub fn select_all_species(&mut self) {
        self.filters.selected_species = Species::ALL.into_iter().collect();
        self.refilter();
    }

    pub fn select_no_species(&mut self) {
        self.filters.selected_species.clear();
        self.refilter();
    }
}
