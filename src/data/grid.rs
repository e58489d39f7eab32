use std::cmp::Ordering;
use std::ops::RangeInclusive;

use super::model::{Record, Species};

// ---------------------------------------------------------------------------
// TableRow – the projection shown in the data grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub species: Species,
    pub island: String,
    pub bill_length_mm: Option<f64>,
    pub bill_depth_mm: Option<f64>,
    pub body_mass_g: Option<f64>,
}

impl From<&Record> for TableRow {
    fn from(r: &Record) -> Self {
        TableRow {
            species: r.species,
            island: r.island.clone(),
            bill_length_mm: r.bill_length_mm,
            bill_depth_mm: r.bill_depth_mm,
            body_mass_g: r.body_mass_g,
        }
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridColumn {
    Species,
    Island,
    BillLength,
    BillDepth,
    BodyMass,
}

impl GridColumn {
    pub const ALL: [GridColumn; 5] = [
        GridColumn::Species,
        GridColumn::Island,
        GridColumn::BillLength,
        GridColumn::BillDepth,
        GridColumn::BodyMass,
    ];

    /// Header label, matching the source column names.
    pub fn title(&self) -> &'static str {
        match self {
            GridColumn::Species => "species",
            GridColumn::Island => "island",
            GridColumn::BillLength => "bill_length_mm",
            GridColumn::BillDepth => "bill_depth_mm",
            GridColumn::BodyMass => "body_mass_g",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, GridColumn::Species | GridColumn::Island)
    }

    fn index(&self) -> usize {
        *self as usize
    }

    fn numeric(&self, row: &TableRow) -> Option<f64> {
        match self {
            GridColumn::BillLength => row.bill_length_mm,
            GridColumn::BillDepth => row.bill_depth_mm,
            GridColumn::BodyMass => row.body_mass_g,
            GridColumn::Species | GridColumn::Island => None,
        }
    }

    fn text<'r>(&self, row: &'r TableRow) -> &'r str {
        match self {
            GridColumn::Species => row.species.as_str(),
            GridColumn::Island => &row.island,
            _ => "",
        }
    }

    /// Cell text as displayed in the grid.
    pub fn display(&self, row: &TableRow) -> String {
        if self.is_numeric() {
            match self.numeric(row) {
                Some(v) => format!("{v}"),
                None => "NA".to_string(),
            }
        } else {
            self.text(row).to_string()
        }
    }

    fn compare(&self, a: &TableRow, b: &TableRow) -> Ordering {
        if self.is_numeric() {
            match (self.numeric(a), self.numeric(b)) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        } else {
            match self {
                GridColumn::Species => a.species.cmp(&b.species),
                _ => self.text(a).cmp(self.text(b)),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Per-column filters
// ---------------------------------------------------------------------------

/// Parsed form of a numeric column filter.
#[derive(Debug, Clone, PartialEq)]
enum NumericFilter {
    Exact(f64),
    Range(RangeInclusive<f64>),
}

/// Parse `"a..b"`, `"a.."`, `"..b"` or a single number.
fn parse_numeric_filter(text: &str) -> Option<NumericFilter> {
    let text = text.trim();
    if let Some((lo, hi)) = text.split_once("..") {
        let lo = match lo.trim() {
            "" => f64::NEG_INFINITY,
            s => parse_finite(s)?,
        };
        let hi = match hi.trim() {
            "" => f64::INFINITY,
            s => parse_finite(s)?,
        };
        return Some(NumericFilter::Range(lo..=hi));
    }
    parse_finite(text).map(NumericFilter::Exact)
}

/// Only finite bounds; `nan` and `inf` are typing mistakes, not filters.
fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Free-text filter per grid column. Empty text means no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridFilters {
    text: [String; 5],
}

impl GridFilters {
    pub fn get(&self, column: GridColumn) -> &str {
        &self.text[column.index()]
    }

    pub fn get_mut(&mut self, column: GridColumn) -> &mut String {
        &mut self.text[column.index()]
    }

    pub fn clear(&mut self) {
        self.text.iter_mut().for_each(String::clear);
    }

    pub fn is_active(&self) -> bool {
        self.text.iter().any(|t| !t.trim().is_empty())
    }

    /// Whether a numeric column's filter text cannot be parsed.
    pub fn is_invalid(&self, column: GridColumn) -> bool {
        let text = self.get(column).trim();
        column.is_numeric() && !text.is_empty() && parse_numeric_filter(text).is_none()
    }

    pub fn matches(&self, row: &TableRow) -> bool {
        GridColumn::ALL.iter().all(|&col| {
            let text = self.get(col).trim();
            if text.is_empty() {
                return true;
            }
            if col.is_numeric() {
                let Some(value) = col.numeric(row) else {
                    return false;
                };
                match parse_numeric_filter(text) {
                    Some(NumericFilter::Exact(x)) => value == x,
                    Some(NumericFilter::Range(range)) => range.contains(&value),
                    None => false,
                }
            } else {
                col.text(row)
                    .to_lowercase()
                    .contains(&text.to_lowercase())
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSort {
    pub column: GridColumn,
    pub ascending: bool,
}

impl GridSort {
    /// Header click: ascending, then descending, then unsorted.
    pub fn cycle(current: Option<GridSort>, column: GridColumn) -> Option<GridSort> {
        match current {
            Some(s) if s.column == column && s.ascending => Some(GridSort {
                column,
                ascending: false,
            }),
            Some(s) if s.column == column => None,
            _ => Some(GridSort {
                column,
                ascending: true,
            }),
        }
    }
}

/// Indices into `rows` to display after grid filtering and sorting.
///
/// Sorting is stable and keeps missing values last in both directions.
pub fn visible_rows(rows: &[TableRow], filters: &GridFilters, sort: Option<GridSort>) -> Vec<usize> {
    let mut idx: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| filters.matches(r))
        .map(|(i, _)| i)
        .collect();

    if let Some(GridSort { column, ascending }) = sort {
        idx.sort_by(|&a, &b| {
            let (ra, rb) = (&rows[a], &rows[b]);
            if column.is_numeric() {
                match (column.numeric(ra), column.numeric(rb)) {
                    (Some(_), None) => return Ordering::Less,
                    (None, Some(_)) => return Ordering::Greater,
                    _ => {}
                }
            }
            let ord = column.compare(ra, rb);
            if ascending { ord } else { ord.reverse() }
        });
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(species: Species, island: &str, len: Option<f64>, mass: Option<f64>) -> TableRow {
        TableRow {
            species,
            island: island.to_string(),
            bill_length_mm: len,
            bill_depth_mm: Some(17.0),
            body_mass_g: mass,
        }
    }

    fn rows() -> Vec<TableRow> {
        vec![
            row(Species::Adelie, "Torgersen", Some(39.1), Some(3750.0)),
            row(Species::Gentoo, "Biscoe", Some(46.1), Some(4500.0)),
            row(Species::Adelie, "Biscoe", None, Some(3200.0)),
            row(Species::Chinstrap, "Dream", Some(49.0), None),
        ]
    }

    #[test]
    fn no_filters_keeps_everything_in_order() {
        let rows = rows();
        assert_eq!(visible_rows(&rows, &GridFilters::default(), None), vec![0, 1, 2, 3]);
    }

    #[test]
    fn text_filter_is_case_insensitive_substring() {
        let rows = rows();
        let mut f = GridFilters::default();
        *f.get_mut(GridColumn::Island) = "bis".into();
        assert_eq!(visible_rows(&rows, &f, None), vec![1, 2]);
        *f.get_mut(GridColumn::Species) = "ADEL".into();
        assert_eq!(visible_rows(&rows, &f, None), vec![2]);
        assert!(f.is_active());
        f.clear();
        assert!(!f.is_active());
    }

    #[test]
    fn numeric_ranges_and_exact() {
        let rows = rows();
        let mut f = GridFilters::default();
        *f.get_mut(GridColumn::BodyMass) = "3500..4500".into();
        assert_eq!(visible_rows(&rows, &f, None), vec![0, 1]);
        *f.get_mut(GridColumn::BodyMass) = "..3750".into();
        assert_eq!(visible_rows(&rows, &f, None), vec![0, 2]);
        *f.get_mut(GridColumn::BodyMass) = "4000..".into();
        assert_eq!(visible_rows(&rows, &f, None), vec![1]);
        *f.get_mut(GridColumn::BodyMass) = "3200".into();
        assert_eq!(visible_rows(&rows, &f, None), vec![2]);
    }

    #[test]
    fn missing_value_only_matches_empty_filter() {
        let rows = rows();
        let mut f = GridFilters::default();
        *f.get_mut(GridColumn::BillLength) = "..".into();
        assert_eq!(visible_rows(&rows, &f, None), vec![0, 1, 3]);
    }

    #[test]
    fn invalid_numeric_filter_matches_nothing() {
        let rows = rows();
        let mut f = GridFilters::default();
        *f.get_mut(GridColumn::BillDepth) = "abc".into();
        assert!(f.is_invalid(GridColumn::BillDepth));
        assert!(!f.is_invalid(GridColumn::Island));
        assert!(visible_rows(&rows, &f, None).is_empty());
    }

    #[test]
    fn non_finite_bounds_are_invalid() {
        let mut f = GridFilters::default();
        for text in ["nan", "inf", "inf..", "..-inf", "NaN..5000", "-infinity"] {
            *f.get_mut(GridColumn::BodyMass) = text.into();
            assert!(f.is_invalid(GridColumn::BodyMass), "{text}");
        }
        *f.get_mut(GridColumn::BodyMass) = "..".into();
        assert!(!f.is_invalid(GridColumn::BodyMass));
    }

    #[test]
    fn sort_keeps_missing_last() {
        let rows = rows();
        let f = GridFilters::default();
        let asc = Some(GridSort { column: GridColumn::BillLength, ascending: true });
        assert_eq!(visible_rows(&rows, &f, asc), vec![0, 1, 3, 2]);
        let desc = Some(GridSort { column: GridColumn::BillLength, ascending: false });
        assert_eq!(visible_rows(&rows, &f, desc), vec![3, 1, 0, 2]);
    }

    #[test]
    fn sort_by_text_is_stable() {
        let rows = rows();
        let f = GridFilters::default();
        let sort = Some(GridSort { column: GridColumn::Island, ascending: true });
        assert_eq!(visible_rows(&rows, &f, sort), vec![1, 2, 3, 0]);
        let sort = Some(GridSort { column: GridColumn::Species, ascending: true });
        assert_eq!(visible_rows(&rows, &f, sort), vec![0, 2, 1, 3]);
    }

    #[test]
    fn header_click_cycles() {
        let c = GridColumn::BodyMass;
        let s1 = GridSort::cycle(None, c);
        assert_eq!(s1, Some(GridSort { column: c, ascending: true }));
        let s2 = GridSort::cycle(s1, c);
        assert_eq!(s2, Some(GridSort { column: c, ascending: false }));
        assert_eq!(GridSort::cycle(s2, c), None);
        let other = GridSort::cycle(s2, GridColumn::Island);
        assert_eq!(other, Some(GridSort { column: GridColumn::Island, ascending: true }));
    }

    #[test]
    fn display_marks_missing() {
        let rows = rows();
        assert_eq!(GridColumn::BillLength.display(&rows[2]), "NA");
        assert_eq!(GridColumn::BodyMass.display(&rows[0]), "3750");
        assert_eq!(GridColumn::Island.display(&rows[0]), "Torgersen");
    }
}
