use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::{PenguinTable, Record, Species};
use crate::config::DatasetSource;

/// Penguin table compiled into the binary; used when no file is configured.
const BUNDLED_CSV: &str = include_str!("../../assets/penguins.csv");

const SPECIES: &str = "species";
const ISLAND: &str = "island";
const BILL_LENGTH: &str = "bill_length_mm";
const BILL_DEPTH: &str = "bill_depth_mm";
const FLIPPER_LENGTH: &str = "flipper_length_mm";
const BODY_MASS: &str = "body_mass_g";
const SEX: &str = "sex";
const YEAR: &str = "year";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a penguin table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – palmerpenguins CSV layout, `NA` for missing cells
/// * `.json`    – `[{ "species": "Adelie", "island": ..., ... }, ...]`
/// * `.parquet` – one column per field, nullable numerics
pub fn load_file(path: &Path) -> Result<PenguinTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            load_csv(file)
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Load whichever table the configuration points at.
pub fn load_source(source: &DatasetSource) -> Result<PenguinTable> {
    match source {
        DatasetSource::Bundled => load_bundled(),
        DatasetSource::File(path) => load_file(path),
    }
}

/// Parse the table shipped inside the binary.
pub fn load_bundled() -> Result<PenguinTable> {
    load_csv(BUNDLED_CSV.as_bytes()).context("parsing bundled penguins.csv")
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header positions of the known columns.  Unused columns may be absent.
struct CsvColumns {
    species: usize,
    island: usize,
    bill_length: usize,
    bill_depth: usize,
    body_mass: usize,
    flipper_length: Option<usize>,
    sex: Option<usize>,
    year: Option<usize>,
}

impl CsvColumns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| find(name).with_context(|| format!("CSV missing '{name}' column"));
        Ok(CsvColumns {
            species: require(SPECIES)?,
            island: require(ISLAND)?,
            bill_length: require(BILL_LENGTH)?,
            bill_depth: require(BILL_DEPTH)?,
            body_mass: require(BODY_MASS)?,
            flipper_length: find(FLIPPER_LENGTH),
            sex: find(SEX),
            year: find(YEAR),
        })
    }
}

/// CSV layout: header row with column names, any column order.
/// Missing numeric cells are written `NA` (R export) or left empty.
fn load_csv<R: Read>(input: R) -> Result<PenguinTable> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers().context("reading CSV headers")?.clone();
    let cols = CsvColumns::resolve(&headers)?;

    let mut records = Vec::new();

    // 1-based data row numbers; the header is not counted.
    for (row_no, result) in (1..).zip(reader.records()) {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize| row.get(idx).unwrap_or("");
        let optional_cell = |idx: Option<usize>| idx.map(|i| cell(i)).unwrap_or("");

        let species: Species = cell(cols.species)
            .parse()
            .with_context(|| format!("CSV row {row_no}"))?;

        records.push(Record {
            flipper_length_mm: parse_optional_f64(optional_cell(cols.flipper_length), row_no, FLIPPER_LENGTH)?,
            sex: optional_text(optional_cell(cols.sex)),
            year: parse_optional_year(optional_cell(cols.year), row_no)?,
            ..Record::new(
                species,
                cell(cols.island).trim(),
                parse_optional_f64(cell(cols.bill_length), row_no, BILL_LENGTH)?,
                parse_optional_f64(cell(cols.bill_depth), row_no, BILL_DEPTH)?,
                parse_optional_f64(cell(cols.body_mass), row_no, BODY_MASS)?,
            )
        });
    }

    Ok(PenguinTable::from_records(records))
}

fn is_missing(s: &str) -> bool {
    matches!(s, "" | "NA" | "NaN" | "nan" | "null")
}

fn parse_optional_f64(s: &str, row: usize, col: &str) -> Result<Option<f64>> {
    let s = s.trim();
    if is_missing(s) {
        return Ok(None);
    }
    s.parse::<f64>()
        .map(Some)
        .with_context(|| format!("Row {row}, {col}: '{s}' is not a number"))
}

/// Years are whole numbers; `2007.0` is accepted, `2007.9` is not.
fn parse_optional_year(s: &str, row: usize) -> Result<Option<i64>> {
    let s = s.trim();
    if is_missing(s) {
        return Ok(None);
    }
    if let Ok(year) = s.parse::<i64>() {
        return Ok(Some(year));
    }
    let value = parse_optional_f64(s, row, YEAR)?;
    value.map(|v| whole_year(v, row)).transpose()
}

fn whole_year(value: f64, row: usize) -> Result<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        bail!("Row {row}, {YEAR}: '{value}' is not a whole year");
    }
    Ok(value as i64)
}

fn optional_text(s: &str) -> Option<String> {
    let s = s.trim();
    (!is_missing(s)).then(|| s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "species": "Adelie",
///     "island": "Torgersen",
///     "bill_length_mm": 39.1,
///     "bill_depth_mm": 18.7,
///     "body_mass_g": 3750,
///     "sex": "male"
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<PenguinTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<PenguinTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let rows = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let species: Species = json_str(obj, SPECIES, i)?
            .parse()
            .with_context(|| format!("Row {i}"))?;

        records.push(Record {
            flipper_length_mm: json_f64(obj, FLIPPER_LENGTH, i, false)?,
            sex: obj.get(SEX).and_then(|v| v.as_str()).and_then(optional_text),
            year: json_year(obj, i)?,
            ..Record::new(
                species,
                json_str(obj, ISLAND, i)?,
                json_f64(obj, BILL_LENGTH, i, true)?,
                json_f64(obj, BILL_DEPTH, i, true)?,
                json_f64(obj, BODY_MASS, i, true)?,
            )
        });
    }

    Ok(PenguinTable::from_records(records))
}

fn json_str<'a>(obj: &'a Map<String, JsonValue>, key: &str, row: usize) -> Result<&'a str> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .with_context(|| format!("Row {row}: missing or invalid '{key}'"))
}

/// `null` (or an `"NA"` string) is a missing value.  When `required` the key
/// itself must be present.
fn json_f64(obj: &Map<String, JsonValue>, key: &str, row: usize, required: bool) -> Result<Option<f64>> {
    match obj.get(key) {
        None if required => bail!("Row {row}: missing '{key}'"),
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => Ok(n.as_f64()),
        Some(JsonValue::String(s)) => parse_optional_f64(s, row, key),
        Some(other) => bail!("Row {row}, {key}: expected a number, got {other}"),
    }
}

fn json_year(obj: &Map<String, JsonValue>, row: usize) -> Result<Option<i64>> {
    match obj.get(YEAR) {
        Some(JsonValue::Number(n)) if n.is_i64() => Ok(n.as_i64()),
        Some(JsonValue::String(s)) => parse_optional_year(s, row),
        _ => json_f64(obj, YEAR, row, false)?
            .map(|v| whole_year(v, row))
            .transpose(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field.
///
/// Numeric columns may be Float64/Float32/Int64/Int32 and nullable, which
/// covers files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path) -> Result<PenguinTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        append_batch(&batch, records.len(), &mut records)?;
    }

    Ok(PenguinTable::from_records(records))
}

fn required_column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b Arc<dyn Array>> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn optional_column<'b>(batch: &'b RecordBatch, name: &str) -> Option<&'b Arc<dyn Array>> {
    batch.schema().index_of(name).ok().map(|i| batch.column(i))
}

fn append_batch(batch: &RecordBatch, first_row: usize, out: &mut Vec<Record>) -> Result<()> {
    let species_col = required_column(batch, SPECIES)?;
    let island_col = required_column(batch, ISLAND)?;
    let bill_length_col = required_column(batch, BILL_LENGTH)?;
    let bill_depth_col = required_column(batch, BILL_DEPTH)?;
    let body_mass_col = required_column(batch, BODY_MASS)?;
    let flipper_col = optional_column(batch, FLIPPER_LENGTH);
    let sex_col = optional_column(batch, SEX);
    let year_col = optional_column(batch, YEAR);

    for row in 0..batch.num_rows() {
        let row_no = first_row + row;
        let species: Species = extract_string(species_col, row)?
            .with_context(|| format!("Row {row_no}: null species"))?
            .parse()
            .with_context(|| format!("Row {row_no}"))?;
        let island = extract_string(island_col, row)?.unwrap_or_default();
        let numeric = |col: &Arc<dyn Array>, name: &str| {
            extract_f64(col, row).with_context(|| format!("Row {row_no}: failed to read '{name}'"))
        };

        out.push(Record {
            flipper_length_mm: flipper_col.map(|c| numeric(c, FLIPPER_LENGTH)).transpose()?.flatten(),
            sex: sex_col
                .map(|c| extract_string(c, row))
                .transpose()?
                .flatten()
                .and_then(|s| optional_text(&s)),
            year: year_col.map(|c| extract_year(c, row, row_no)).transpose()?.flatten(),
            ..Record::new(
                species,
                island,
                numeric(bill_length_col, BILL_LENGTH)?,
                numeric(bill_depth_col, BILL_DEPTH)?,
                numeric(body_mass_col, BODY_MASS)?,
            )
        });
    }
    Ok(())
}

// -- Arrow helpers --

/// Extract a nullable string cell.
fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Utf8 => {
            let s = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(Some(s.value(row).to_string()))
        }
        DataType::LargeUtf8 => Ok(Some(col.as_string::<i64>().value(row).to_string())),
        other => bail!("Expected a string column, got {other:?}"),
    }
}

/// Extract a nullable numeric cell as `f64`.  NaN counts as missing.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Float64 => downcast::<Float64Array>(col)?.value(row),
        DataType::Float32 => downcast::<Float32Array>(col)?.value(row) as f64,
        DataType::Int64 => downcast::<Int64Array>(col)?.value(row) as f64,
        DataType::Int32 => downcast::<Int32Array>(col)?.value(row) as f64,
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok((!value.is_nan()).then_some(value))
}

/// Integer columns are taken as-is; float columns must hold whole years.
fn extract_year(col: &Arc<dyn Array>, row: usize, row_no: usize) -> Result<Option<i64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Int64 => Ok(Some(downcast::<Int64Array>(col)?.value(row))),
        DataType::Int32 => Ok(Some(downcast::<Int32Array>(col)?.value(row) as i64)),
        _ => extract_f64(col, row)
            .with_context(|| format!("Row {row_no}: failed to read '{YEAR}'"))?
            .map(|v| whole_year(v, row_no))
            .transpose(),
    }
}

fn downcast<T: Array + 'static>(col: &Arc<dyn Array>) -> Result<&T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("unexpected array type {:?}", col.data_type()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const SAMPLE: &str = "\
species,island,bill_length_mm,bill_depth_mm,flipper_length_mm,body_mass_g,sex,year
Adelie,Torgersen,39.1,18.7,181,3750,male,2007
Adelie,Torgersen,NA,NA,NA,NA,NA,2007
Gentoo,Biscoe,46.1,13.2,211,4500,female,2007
Chinstrap,Dream,46.5,17.9,192,3500,female,2007
";

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("penguin-dash-{}-{name}", std::process::id()))
    }

    #[test]
    fn csv_with_na_cells() {
        let table = load_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 4);
        let r0 = &table.records()[0];
        assert_eq!(r0.species, Species::Adelie);
        assert_eq!(r0.island, "Torgersen");
        assert_eq!(r0.bill_length_mm, Some(39.1));
        assert_eq!(r0.body_mass_g, Some(3750.0));
        assert_eq!(r0.sex.as_deref(), Some("male"));
        assert_eq!(r0.year, Some(2007));
        let r1 = &table.records()[1];
        assert_eq!(r1.bill_length_mm, None);
        assert_eq!(r1.body_mass_g, None);
        assert_eq!(r1.sex, None);
        assert_eq!(table.incomplete_count(), 1);
    }

    #[test]
    fn csv_column_order_is_free_and_extras_optional() {
        let text = "body_mass_g,species,bill_depth_mm,island,bill_length_mm\n4000,Gentoo,15.0,Biscoe,47.0\n";
        let table = load_csv(text.as_bytes()).unwrap();
        let r = &table.records()[0];
        assert_eq!(r.species, Species::Gentoo);
        assert_eq!(r.body_mass_g, Some(4000.0));
        assert_eq!(r.flipper_length_mm, None);
        assert_eq!(r.year, None);
    }

    #[test]
    fn csv_unknown_species_names_the_row() {
        let text = "species,island,bill_length_mm,bill_depth_mm,body_mass_g\nAdelie,Dream,1,2,3\nEmperor,Dream,1,2,3\n";
        let err = load_csv(text.as_bytes()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("CSV row 2"), "{msg}");
        assert!(msg.contains("Emperor"), "{msg}");
    }

    #[test]
    fn csv_missing_required_column() {
        let text = "species,island,bill_length_mm,bill_depth_mm\nAdelie,Dream,1,2\n";
        let err = load_csv(text.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("body_mass_g"));
    }

    #[test]
    fn csv_bad_number() {
        let text = "species,island,bill_length_mm,bill_depth_mm,body_mass_g\nAdelie,Dream,long,2,3\n";
        let err = load_csv(text.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("'long' is not a number"));
    }

    #[test]
    fn bundled_dataset_parses() {
        let table = load_bundled().unwrap();
        assert_eq!(table.len(), 344);
        assert!(table.species_counts().iter().all(|&(_, n)| n > 0));
    }

    #[test]
    fn json_records() {
        let text = r#"[
            {"species": "Adelie", "island": "Torgersen", "bill_length_mm": 39.1,
             "bill_depth_mm": 18.7, "body_mass_g": 3750, "sex": "male", "year": 2007},
            {"species": "Gentoo", "island": "Biscoe", "bill_length_mm": null,
             "bill_depth_mm": null, "body_mass_g": null, "sex": null}
        ]"#;
        let table = parse_json(text).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0].body_mass_g, Some(3750.0));
        assert_eq!(table.records()[0].year, Some(2007));
        assert_eq!(table.records()[1].species, Species::Gentoo);
        assert_eq!(table.records()[1].bill_length_mm, None);
        assert_eq!(table.records()[1].sex, None);
    }

    #[test]
    fn json_requires_measurement_keys() {
        let text = r#"[{"species": "Adelie", "island": "Dream", "bill_length_mm": 1.0, "bill_depth_mm": 2.0}]"#;
        let err = parse_json(text).unwrap_err();
        assert!(format!("{err:#}").contains("missing 'body_mass_g'"));
    }

    #[test]
    fn parquet_round_trip_via_file() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("species", DataType::Utf8, false),
            Field::new("island", DataType::Utf8, false),
            Field::new("bill_length_mm", DataType::Float64, true),
            Field::new("bill_depth_mm", DataType::Float64, true),
            Field::new("body_mass_g", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Adelie", "Chinstrap"])),
                Arc::new(StringArray::from(vec!["Dream", "Dream"])),
                Arc::new(Float64Array::from(vec![Some(37.0), None])),
                Arc::new(Float64Array::from(vec![Some(18.0), Some(f64::NAN)])),
                Arc::new(Int64Array::from(vec![Some(3400), None])),
            ],
        )
        .unwrap();

        let path = temp_path("round.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.len(), 2);
        let r0 = &table.records()[0];
        assert_eq!(r0.body_mass_g, Some(3400.0));
        assert_eq!(r0.bill_length_mm, Some(37.0));
        let r1 = &table.records()[1];
        assert_eq!(r1.species, Species::Chinstrap);
        assert_eq!(r1.bill_length_mm, None);
        assert_eq!(r1.bill_depth_mm, None);
        assert_eq!(r1.body_mass_g, None);
        assert_eq!(r1.sex, None);
    }

    #[test]
    fn csv_header_only_is_an_empty_table() {
        let text = "species,island,bill_length_mm,bill_depth_mm,body_mass_g\n";
        let table = load_csv(text.as_bytes()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn fractional_year_is_rejected() {
        let csv = "species,island,bill_length_mm,bill_depth_mm,body_mass_g,year\nAdelie,Dream,1,2,3,2007.0\nAdelie,Dream,1,2,3,2007.9\n";
        let err = load_csv(csv.as_bytes()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("not a whole year"), "{msg}");
        assert!(msg.contains("Row 2"), "{msg}");

        let ok = load_csv(&csv.as_bytes()[..csv.rfind("Adelie").unwrap()]).unwrap();
        assert_eq!(ok.records()[0].year, Some(2007));

        let json = r#"[{"species": "Gentoo", "island": "Biscoe", "bill_length_mm": 1,
                        "bill_depth_mm": 2, "body_mass_g": 3, "year": 2008.5}]"#;
        assert!(format!("{:#}", parse_json(json).unwrap_err()).contains("not a whole year"));
    }

    #[test]
    fn parquet_float_year_must_be_whole() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("species", DataType::Utf8, false),
            Field::new("island", DataType::Utf8, false),
            Field::new("bill_length_mm", DataType::Float64, true),
            Field::new("bill_depth_mm", DataType::Float64, true),
            Field::new("body_mass_g", DataType::Float64, true),
            Field::new("year", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["Adelie", "Adelie"])),
                Arc::new(StringArray::from(vec!["Dream", "Dream"])),
                Arc::new(Float64Array::from(vec![37.0, 38.0])),
                Arc::new(Float64Array::from(vec![18.0, 18.5])),
                Arc::new(Float64Array::from(vec![3400.0, 3500.0])),
                Arc::new(Float64Array::from(vec![Some(2009.0), Some(2007.9)])),
            ],
        )
        .unwrap();

        let mut whole = Vec::new();
        append_batch(&batch.slice(0, 1), 0, &mut whole).unwrap();
        assert_eq!(whole[0].year, Some(2009));

        let err = append_batch(&batch, 0, &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("not a whole year"));
    }

    #[test]
    fn json_round_trip_via_file() {
        let text = r#"[
            {"species": "Chinstrap", "island": "Dream", "bill_length_mm": 46.5,
             "bill_depth_mm": 17.9, "flipper_length_mm": 192, "body_mass_g": 3500,
             "sex": "female", "year": 2009}
        ]"#;
        let path = temp_path("round.json");
        std::fs::write(&path, text).unwrap();
        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.len(), 1);
        let r = &table.records()[0];
        assert_eq!(r.species, Species::Chinstrap);
        assert_eq!(r.flipper_length_mm, Some(192.0));
        assert_eq!(r.body_mass_g, Some(3500.0));
        assert_eq!(r.year, Some(2009));
    }

    #[test]
    fn missing_file_becomes_configuration_error() {
        let source = DatasetSource::File("/nonexistent/p.csv".into());
        let err = load_source(&source).unwrap_err();
        let err = crate::error::DashError::configuration(source.to_string(), &err);
        let msg = err.to_string();
        assert!(msg.contains("/nonexistent/p.csv"), "{msg}");
        assert!(msg.contains("opening CSV"), "{msg}");
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("penguins.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
