use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Per-species measurement profile: (mean, std-dev) pairs.
struct Profile {
    species: &'static str,
    /// (island, count) blocks in output order.
    islands: &'static [(&'static str, usize)],
    bill_length: (f64, f64),
    bill_depth: (f64, f64),
    flipper_length: (f64, f64),
    body_mass: (f64, f64),
    /// Rows with every measurement missing.
    missing_rows: &'static [usize],
    /// Rows with only `sex` missing.
    missing_sex: &'static [usize],
}

const PROFILES: [Profile; 3] = [
    Profile {
        species: "Adelie",
        islands: &[("Torgersen", 52), ("Biscoe", 44), ("Dream", 56)],
        bill_length: (38.8, 2.66),
        bill_depth: (18.35, 1.22),
        flipper_length: (190.0, 6.5),
        body_mass: (3700.0, 459.0),
        missing_rows: &[3],
        missing_sex: &[8, 9, 10, 11, 47],
    },
    Profile {
        species: "Gentoo",
        islands: &[("Biscoe", 124)],
        bill_length: (47.5, 3.08),
        bill_depth: (15.0, 0.98),
        flipper_length: (217.0, 6.5),
        body_mass: (5076.0, 504.0),
        missing_rows: &[123],
        missing_sex: &[9, 46, 64, 118],
    },
    Profile {
        species: "Chinstrap",
        islands: &[("Dream", 68)],
        bill_length: (48.8, 3.34),
        bill_depth: (18.4, 1.14),
        flipper_length: (196.0, 7.1),
        body_mass: (3733.0, 384.0),
        missing_rows: &[],
        missing_sex: &[],
    },
];

/// One output row in the palmerpenguins column layout.
#[derive(Debug, Serialize)]
struct Row {
    species: &'static str,
    island: &'static str,
    bill_length_mm: Option<f64>,
    bill_depth_mm: Option<f64>,
    flipper_length_mm: Option<f64>,
    body_mass_g: Option<f64>,
    sex: Option<&'static str>,
    year: i64,
}

fn round_to(v: f64, step: f64) -> f64 {
    (v / step + 0.5).floor() * step
}

fn round_1dp(v: f64) -> f64 {
    (v * 10.0 + 0.5).floor() / 10.0
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    for p in &PROFILES {
        let n: usize = p.islands.iter().map(|&(_, c)| c).sum();
        let islands = p
            .islands
            .iter()
            .flat_map(|&(name, count)| std::iter::repeat(name).take(count));

        for (i, island) in islands.enumerate() {
            let year = 2007 + (i * 3 / n) as i64;
            // Alternate sexes; males sit half a std-dev above the species mean.
            let male = i % 2 == 0;
            let shift = if male { 0.5 } else { -0.5 };
            let mut draw = |(mean, sd): (f64, f64)| rng.gauss(mean + shift * sd, sd * 0.8);

            let bill_length = round_1dp(draw(p.bill_length));
            let bill_depth = round_1dp(draw(p.bill_depth));
            let flipper_length = round_to(draw(p.flipper_length), 1.0);
            let body_mass = round_to(draw(p.body_mass), 25.0);

            if p.missing_rows.contains(&i) {
                rows.push(Row {
                    species: p.species,
                    island,
                    bill_length_mm: None,
                    bill_depth_mm: None,
                    flipper_length_mm: None,
                    body_mass_g: None,
                    sex: None,
                    year,
                });
                continue;
            }

            let sex = if p.missing_sex.contains(&i) {
                None
            } else if male {
                Some("male")
            } else {
                Some("female")
            };

            rows.push(Row {
                species: p.species,
                island,
                bill_length_mm: Some(bill_length),
                bill_depth_mm: Some(bill_depth),
                flipper_length_mm: Some(flipper_length),
                body_mass_g: Some(body_mass),
                sex,
                year,
            });
        }
    }
    rows
}

fn write_csv(rows: &[Row], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record([
        "species",
        "island",
        "bill_length_mm",
        "bill_depth_mm",
        "flipper_length_mm",
        "body_mass_g",
        "sex",
        "year",
    ])?;
    let num = |v: Option<f64>| v.map_or_else(|| "NA".to_string(), |x| format!("{x}"));
    for r in rows {
        writer.write_record([
            r.species.to_string(),
            r.island.to_string(),
            num(r.bill_length_mm),
            num(r.bill_depth_mm),
            num(r.flipper_length_mm),
            num(r.body_mass_g),
            r.sex.unwrap_or("NA").to_string(),
            r.year.to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_json(rows: &[Row], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).context("creating JSON file")?;
    serde_json::to_writer_pretty(file, rows).context("writing JSON")?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("species", DataType::Utf8, false),
        Field::new("island", DataType::Utf8, false),
        Field::new("bill_length_mm", DataType::Float64, true),
        Field::new("bill_depth_mm", DataType::Float64, true),
        Field::new("flipper_length_mm", DataType::Float64, true),
        Field::new("body_mass_g", DataType::Float64, true),
        Field::new("sex", DataType::Utf8, true),
        Field::new("year", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.species))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.island))),
            Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.bill_length_mm))),
            Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.bill_depth_mm))),
            Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.flipper_length_mm))),
            Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.body_mass_g))),
            Arc::new(StringArray::from_iter(rows.iter().map(|r| r.sex))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.year))),
        ],
    )
    .context("building record batch")?;

    let preview = arrow::util::pretty::pretty_format_batches(&[batch.slice(0, batch.num_rows().min(5))])
        .context("formatting preview")?;
    println!("{preview}");

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "penguins.parquet".to_string());
    let path = Path::new(&output);

    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&rows, path)?,
        "json" => write_json(&rows, path)?,
        "parquet" | "pq" => write_parquet(&rows, path)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    println!("Wrote {} penguins to {output}", rows.len());
    Ok(())
}
