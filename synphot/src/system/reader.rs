//! Reader that groups planet rows into star systems
//!
//! A P-pop table has one row per planet. Rows belonging to the same star in
//! the same universe are contiguous, so a system is the longest run of rows
//! sharing `(Nuniverse, Nstar)`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info};
use thiserror::Error;

use super::schema::{Column, Schema, SchemaError};
use super::{HostStar, PlanetRow, System, SystemBuilder};

/// Errors raised while reading a planet population table
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("Failed to read planet table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Line {line}: column {column} has unparseable value {value:?}")]
    MalformedRow {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("Line {line}: expected at least {expected} fields, found {found}")]
    ShortRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "Line {line}: star-level column {column} differs from earlier rows of universe {universe} star {star_index}"
    )]
    InconsistentStar {
        line: usize,
        column: &'static str,
        universe: u64,
        star_index: u64,
    },
}

/// A sequential supply of systems that knows how far into the table it is
pub trait SystemSource {
    /// Read the next system, `Ok(None)` once the table is exhausted
    fn next_system(&mut self) -> Result<Option<System>, ReaderError>;

    /// Number of planet rows consumed so far
    fn rows_consumed(&self) -> usize;
}

/// Row positions of the header and the first planet in a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    /// Zero-based line holding the column names
    pub header_row: usize,
    /// Zero-based line of the first planet row
    pub first_data_row: usize,
}

impl Default for TableLayout {
    /// Current P-pop layout: line 0 is the legacy header, line 1 the
    /// authoritative header, planets start on line 2
    fn default() -> Self {
        Self {
            header_row: 1,
            first_data_row: 2,
        }
    }
}

#[derive(Debug, Clone)]
struct DataRow {
    /// One-based line number in the source file
    line: usize,
    text: String,
}

/// Groups the rows of a planet population table into [`System`] records
///
/// The cursor only advances past a group once the whole group parsed, so a
/// failed read can be retried or reported without splitting the system.
#[derive(Debug, Clone)]
pub struct SystemReader {
    source: Option<PathBuf>,
    schema: Schema,
    rows: Vec<DataRow>,
    cursor: usize,
}

impl SystemReader {
    /// Read a table from disk using the default layout
    pub fn open(path: &Path) -> Result<Self, ReaderError> {
        Self::open_with_layout(path, TableLayout::default())
    }

    /// Read a table from disk with an explicit layout
    pub fn open_with_layout(path: &Path, layout: TableLayout) -> Result<Self, ReaderError> {
        info!("Initializing system reader for {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| ReaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = Self::from_text_with_layout(&text, layout)?;
        reader.source = Some(path.to_path_buf());
        Ok(reader)
    }

    /// Parse a table already held in memory using the default layout
    pub fn from_text(text: &str) -> Result<Self, ReaderError> {
        Self::from_text_with_layout(text, TableLayout::default())
    }

    /// Parse a table already held in memory with an explicit layout
    pub fn from_text_with_layout(text: &str, layout: TableLayout) -> Result<Self, ReaderError> {
        let lines: Vec<&str> = text.lines().collect();

        let header = lines
            .get(layout.header_row)
            .ok_or(SchemaError::MissingHeader {
                header_row: layout.header_row,
                lines: lines.len(),
            })?;
        let schema = Schema::resolve(header)?;

        let rows: Vec<DataRow> = lines
            .iter()
            .enumerate()
            .skip(layout.first_data_row)
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(index, text)| DataRow {
                line: index + 1,
                text: text.to_string(),
            })
            .collect();

        debug!("Planet table holds {} planet rows", rows.len());

        Ok(Self {
            source: None,
            schema,
            rows,
            cursor: 0,
        })
    }

    /// Path the table was read from, if it came from disk
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of planet rows in the table
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    /// Rewind to the first planet row without re-reading the table
    ///
    /// Systems are read through [`SystemSource`].
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Independent pass over all systems, leaving this reader's cursor untouched
    pub fn systems(&self) -> Systems<'_> {
        Systems {
            rows: &self.rows,
            schema: &self.schema,
            cursor: 0,
            failed: false,
        }
    }
}

/// Iterator over the systems of a table with its own cursor
#[derive(Debug, Clone)]
pub struct Systems<'a> {
    rows: &'a [DataRow],
    schema: &'a Schema,
    cursor: usize,
    failed: bool,
}

impl Systems<'_> {
    /// Number of planet rows in the table
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }
}

impl SystemSource for SystemReader {
    fn next_system(&mut self) -> Result<Option<System>, ReaderError> {
        read_group(&self.rows, &self.schema, &mut self.cursor)
    }

    fn rows_consumed(&self) -> usize {
        self.cursor
    }
}

impl SystemSource for Systems<'_> {
    fn next_system(&mut self) -> Result<Option<System>, ReaderError> {
        self.next().transpose()
    }

    fn rows_consumed(&self) -> usize {
        self.cursor
    }
}

impl Iterator for Systems<'_> {
    type Item = Result<System, ReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match read_group(self.rows, self.schema, &mut self.cursor) {
            Ok(system) => system.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Consume one `(universe, star)` group starting at `cursor`
///
/// On error `cursor` is left at the first row of the group.
fn read_group(
    rows: &[DataRow],
    schema: &Schema,
    cursor: &mut usize,
) -> Result<Option<System>, ReaderError> {
    let Some(first) = rows.get(*cursor) else {
        return Ok(None);
    };

    let fields = split_row(first, schema)?;
    let (universe, star_index) = parse_key(&fields, schema, first.line)?;
    let mut builder = SystemBuilder::new(universe, star_index, parse_star(&fields, schema, first.line)?);
    builder.push(parse_planet(&fields, schema, first.line)?);
    let mut next = *cursor + 1;

    while let Some(row) = rows.get(next) {
        let fields = split_row(row, schema)?;
        let (universe, star_index) = parse_key(&fields, schema, row.line)?;
        if !builder.accepts(universe, star_index) {
            break;
        }

        let star = parse_star(&fields, schema, row.line)?;
        if let Some(column) = first_difference(builder.star(), &star) {
            return Err(ReaderError::InconsistentStar {
                line: row.line,
                column: column.name(),
                universe,
                star_index,
            });
        }

        builder.push(parse_planet(&fields, schema, row.line)?);
        next += 1;
    }

    *cursor = next;
    Ok(Some(builder.build()))
}

fn split_row<'a>(row: &'a DataRow, schema: &Schema) -> Result<Vec<&'a str>, ReaderError> {
    let fields: Vec<&str> = row.text.split('\t').collect();
    if fields.len() < schema.min_fields() {
        return Err(ReaderError::ShortRow {
            line: row.line,
            expected: schema.min_fields(),
            found: fields.len(),
        });
    }
    Ok(fields)
}

fn field<T: FromStr>(
    fields: &[&str],
    schema: &Schema,
    column: Column,
    line: usize,
) -> Result<T, ReaderError> {
    let raw = fields[schema.index(column)].trim();
    raw.parse().map_err(|_| ReaderError::MalformedRow {
        line,
        column: column.name(),
        value: raw.to_string(),
    })
}

fn parse_key(fields: &[&str], schema: &Schema, line: usize) -> Result<(u64, u64), ReaderError> {
    Ok((
        field(fields, schema, Column::Nuniverse, line)?,
        field(fields, schema, Column::Nstar, line)?,
    ))
}

fn parse_star(fields: &[&str], schema: &Schema, line: usize) -> Result<HostStar, ReaderError> {
    Ok(HostStar {
        radius: field(fields, schema, Column::Rs, line)?,
        mass: field(fields, schema, Column::Ms, line)?,
        temperature: field(fields, schema, Column::Ts, line)?,
        distance: field(fields, schema, Column::Ds, line)?,
        spectral_type: fields[schema.index(Column::Stype)].trim().to_string(),
        ra: field(fields, schema, Column::Ra, line)?,
        dec: field(fields, schema, Column::Dec, line)?,
    })
}

fn parse_planet(fields: &[&str], schema: &Schema, line: usize) -> Result<PlanetRow, ReaderError> {
    let f = |column| field::<f64>(fields, schema, column, line);

    Ok(PlanetRow {
        radius: f(Column::Rp)?,
        period: f(Column::Porb)?,
        mass: f(Column::Mp)?,
        eccentricity: f(Column::Ep)?,
        inclination: f(Column::Ip)?,
        ascending_node: f(Column::OmegaNode)?,
        periapsis: f(Column::OmegaPeri)?,
        true_anomaly: f(Column::Thetap)?,
        bond_albedo: f(Column::Abond)?,
        geometric_albedo_vis: f(Column::AgeomVis)?,
        geometric_albedo_mir: f(Column::AgeomMir)?,
        exozodi: f(Column::Z)?,
        semi_major_axis: f(Column::Ap)?,
        separation: f(Column::SmallRp)?,
        angular_separation: f(Column::AngSep)?,
        max_angular_separation: f(Column::MaxAngSep)?,
        incident_flux: f(Column::Fp)?,
        reflectance: f(Column::SmallFp)?,
        equilibrium_temperature: f(Column::Tp)?,
    })
}

fn first_difference(expected: &HostStar, found: &HostStar) -> Option<Column> {
    let same = |a: f64, b: f64| a == b || (a.is_nan() && b.is_nan());

    if !same(expected.radius, found.radius) {
        Some(Column::Rs)
    } else if !same(expected.mass, found.mass) {
        Some(Column::Ms)
    } else if !same(expected.temperature, found.temperature) {
        Some(Column::Ts)
    } else if !same(expected.distance, found.distance) {
        Some(Column::Ds)
    } else if expected.spectral_type != found.spectral_type {
        Some(Column::Stype)
    } else if !same(expected.ra, found.ra) {
        Some(Column::Ra)
    } else if !same(expected.dec, found.dec) {
        Some(Column::Dec)
    } else {
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Header line with the columns in a scrambled order
    const HEADER: &str = "Nstar\tRp\tPorb\tMp\tep\tip\tOmegap\tomegap\tthetap\tAbond\tAgeomVIS\tAgeomMIR\tz\tap\trp\tAngSep\tmaxAngSep\tFp\tfp\tTp\tNuniverse\tRs\tMs\tTs\tDs\tStype\tRA\tDec";

    /// Format one data row matching `HEADER`
    pub(crate) fn row(universe: u64, star: u64, rp: f64, rs: f64, ts: f64, ds: f64) -> String {
        format!(
            "{star}\t{rp}\t10.0\t1.0\t0.0\t0.1\t0.2\t0.3\t0.4\t0.3\t0.3\t0.1\t1.0\t0.5\t0.5\t0.05\t0.05\t1.0\t0.3\t280.0\t{universe}\t{rs}\t1.0\t{ts}\t{ds}\tG\t10.0\t-5.0"
        )
    }

    /// Full table text: legacy header, header, data rows
    pub(crate) fn table(rows: &[String]) -> String {
        let mut text = String::from("legacy\theader\n");
        text.push_str(HEADER);
        text.push('\n');
        for r in rows {
            text.push_str(r);
            text.push('\n');
        }
        text
    }

    fn drain(reader: &mut SystemReader) -> Vec<System> {
        let mut systems = Vec::new();
        while let Some(system) = reader.next_system().unwrap() {
            systems.push(system);
        }
        systems
    }

    #[test]
    fn test_group_counts_and_lengths() {
        let text = table(&[
            row(0, 0, 1.0, 1.0, 5800.0, 10.0),
            row(0, 0, 2.0, 1.0, 5800.0, 10.0),
            row(0, 1, 3.0, 0.5, 4000.0, 5.0),
            row(1, 0, 4.0, 1.0, 5800.0, 10.0),
            row(1, 0, 5.0, 1.0, 5800.0, 10.0),
            row(1, 0, 6.0, 1.0, 5800.0, 10.0),
        ]);
        let mut reader = SystemReader::from_text(&text).unwrap();
        assert_eq!(reader.total_rows(), 6);

        let systems = drain(&mut reader);
        assert_eq!(systems.len(), 3);

        let counts: Vec<usize> = systems.iter().map(System::planet_count).collect();
        assert_eq!(counts, vec![2, 1, 3]);
        assert_eq!(counts.iter().sum::<usize>(), 6);

        for system in &systems {
            let p = system.planets();
            let n = system.planet_count();
            assert_eq!(p.period.len(), n);
            assert_eq!(p.equilibrium_temperature.len(), n);
            assert_eq!(p.reflectance.len(), n);
        }

        assert_eq!(systems[1].star_index(), 1);
        assert_eq!(systems[1].star().temperature, 4000.0);
        assert_eq!(systems[2].universe(), 1);
        assert_eq!(systems[2].planets().radius, vec![4.0, 5.0, 6.0]);
        assert_eq!(reader.rows_consumed(), 6);
    }

    #[test]
    fn test_same_universe_new_star_splits() {
        let text = table(&[
            row(3, 0, 1.0, 1.0, 5800.0, 10.0),
            row(3, 1, 1.0, 1.0, 5800.0, 10.0),
        ]);
        let mut reader = SystemReader::from_text(&text).unwrap();
        assert_eq!(drain(&mut reader).len(), 2);
    }

    #[test]
    fn test_same_key_joins_regardless_of_planet_fields() {
        let mut second = row(2, 4, 9.0, 1.0, 5800.0, 10.0);
        second = second.replacen("10.0\t1.0", "99.0\t7.0", 1);
        let text = table(&[row(2, 4, 1.0, 1.0, 5800.0, 10.0), second]);

        let mut reader = SystemReader::from_text(&text).unwrap();
        let systems = drain(&mut reader);
        assert_eq!(systems.len(), 1);
        assert_eq!(systems[0].planets().period, vec![10.0, 99.0]);
    }

    #[test]
    fn test_non_contiguous_key_is_a_new_system() {
        let text = table(&[
            row(0, 0, 1.0, 1.0, 5800.0, 10.0),
            row(0, 1, 1.0, 1.0, 5800.0, 10.0),
            row(0, 0, 1.0, 1.0, 5800.0, 10.0),
        ]);
        let mut reader = SystemReader::from_text(&text).unwrap();
        assert_eq!(drain(&mut reader).len(), 3);
    }

    #[test]
    fn test_reset_replays_identically() {
        let text = table(&[
            row(0, 0, 1.0, 1.0, 5800.0, 10.0),
            row(0, 1, 2.0, 0.8, 5000.0, 12.0),
            row(0, 1, 3.0, 0.8, 5000.0, 12.0),
        ]);
        let mut reader = SystemReader::from_text(&text).unwrap();

        let first = drain(&mut reader);
        assert!(reader.next_system().unwrap().is_none());

        reader.reset();
        assert_eq!(reader.rows_consumed(), 0);
        let second = drain(&mut reader);
        assert_eq!(first, second);
    }

    #[test]
    fn test_independent_pass_matches_cursor_pass() {
        let text = table(&[
            row(0, 0, 1.0, 1.0, 5800.0, 10.0),
            row(1, 0, 2.0, 0.8, 5000.0, 12.0),
        ]);
        let mut reader = SystemReader::from_text(&text).unwrap();

        let independent: Vec<System> = reader.systems().map(Result::unwrap).collect();
        assert_eq!(reader.rows_consumed(), 0);
        assert_eq!(independent, drain(&mut reader));
    }

    #[test]
    fn test_empty_table() {
        let mut reader = SystemReader::from_text(&table(&[])).unwrap();
        assert_eq!(reader.total_rows(), 0);
        assert!(reader.next_system().unwrap().is_none());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let mut text = table(&[row(0, 0, 1.0, 1.0, 5800.0, 10.0)]);
        text.push_str("\n   \n");
        let mut reader = SystemReader::from_text(&text).unwrap();
        assert_eq!(reader.total_rows(), 1);
        assert_eq!(drain(&mut reader).len(), 1);
    }

    #[test]
    fn test_inconsistent_star_rejected() {
        let text = table(&[
            row(0, 0, 1.0, 1.0, 5800.0, 10.0),
            row(0, 0, 2.0, 1.0, 5900.0, 10.0),
        ]);
        let mut reader = SystemReader::from_text(&text).unwrap();

        match reader.next_system() {
            Err(ReaderError::InconsistentStar { line, column, .. }) => {
                assert_eq!(line, 4);
                assert_eq!(column, "Ts");
            }
            other => panic!("expected inconsistent star, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_value_reports_column_and_line() {
        let bad = row(0, 0, 1.0, 1.0, 5800.0, 10.0).replacen("\t1.0\t", "\tabc\t", 1);
        let text = table(&[row(0, 0, 1.0, 1.0, 5800.0, 10.0), bad]);
        let mut reader = SystemReader::from_text(&text).unwrap();

        match reader.next_system() {
            Err(ReaderError::MalformedRow { line, column, value }) => {
                assert_eq!(line, 4);
                assert_eq!(column, "Mp");
                assert_eq!(value, "abc");
            }
            other => panic!("expected malformed row, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_group_is_not_split_on_retry() {
        let bad = row(0, 0, 2.0, 1.0, 5800.0, 10.0).replacen("\t1.0\t", "\tabc\t", 1);
        let text = table(&[
            row(0, 0, 1.0, 1.0, 5800.0, 10.0),
            bad,
            row(0, 0, 3.0, 1.0, 5800.0, 10.0),
        ]);
        let mut reader = SystemReader::from_text(&text).unwrap();

        assert!(matches!(
            reader.next_system(),
            Err(ReaderError::MalformedRow { line: 4, .. })
        ));
        assert_eq!(reader.rows_consumed(), 0);

        // Retrying hits the same row instead of returning the tail of the group
        assert!(matches!(
            reader.next_system(),
            Err(ReaderError::MalformedRow { line: 4, .. })
        ));
        assert_eq!(reader.rows_consumed(), 0);
    }

    #[test]
    fn test_inconsistent_star_leaves_cursor_at_group_start() {
        let text = table(&[
            row(0, 0, 1.0, 1.0, 5800.0, 10.0),
            row(1, 0, 1.0, 1.0, 5800.0, 10.0),
            row(1, 0, 2.0, 1.1, 5800.0, 10.0),
        ]);
        let mut reader = SystemReader::from_text(&text).unwrap();

        assert_eq!(reader.next_system().unwrap().unwrap().universe(), 0);
        assert_eq!(reader.rows_consumed(), 1);
        assert!(reader.next_system().is_err());
        assert_eq!(reader.rows_consumed(), 1);
    }

    #[test]
    fn test_source_positions_track_rows() {
        let text = table(&[
            row(0, 0, 1.0, 1.0, 5800.0, 10.0),
            row(0, 0, 2.0, 1.0, 5800.0, 10.0),
            row(0, 1, 1.0, 1.0, 5800.0, 10.0),
        ]);
        let reader = SystemReader::from_text(&text).unwrap();
        let mut systems = reader.systems();

        assert_eq!(systems.rows_consumed(), 0);
        assert_eq!(systems.total_rows(), 3);
        systems.next_system().unwrap();
        assert_eq!(systems.rows_consumed(), 2);
        systems.next_system().unwrap();
        assert_eq!(systems.rows_consumed(), 3);
        assert!(systems.next_system().unwrap().is_none());
    }

    #[test]
    fn test_short_row() {
        let text = table(&["0\t1.0\t2.0".to_string()]);
        let mut reader = SystemReader::from_text(&text).unwrap();
        assert!(matches!(
            reader.next_system(),
            Err(ReaderError::ShortRow { line: 3, found: 3, .. })
        ));
    }

    #[test]
    fn test_systems_iterator_stops_after_error() {
        let text = table(&["garbage".to_string(), row(0, 0, 1.0, 1.0, 5800.0, 10.0)]);
        let reader = SystemReader::from_text(&text).unwrap();
        let mut systems = reader.systems();
        assert!(matches!(systems.next(), Some(Err(_))));
        assert!(systems.next().is_none());
    }

    #[test]
    fn test_missing_header() {
        let result = SystemReader::from_text("only one line\n");
        assert!(matches!(
            result,
            Err(ReaderError::Schema(SchemaError::MissingHeader { .. }))
        ));
    }

    #[test]
    fn test_missing_columns() {
        let result = SystemReader::from_text("legacy\nNuniverse\tNstar\n");
        assert!(matches!(
            result,
            Err(ReaderError::Schema(SchemaError::MissingColumns(ref names))) if names.len() == 26
        ));
    }

    #[test]
    fn test_custom_layout() {
        let text = format!("{HEADER}\n{}\n", row(0, 0, 1.0, 1.0, 5800.0, 10.0));
        let layout = TableLayout {
            header_row: 0,
            first_data_row: 1,
        };
        let mut reader = SystemReader::from_text_with_layout(&text, layout).unwrap();
        assert_eq!(drain(&mut reader).len(), 1);
    }

    #[test]
    fn test_open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Pop.txt");
        std::fs::write(&path, table(&[row(0, 0, 1.0, 1.0, 5800.0, 10.0)])).unwrap();

        let reader = SystemReader::open(&path).unwrap();
        assert_eq!(reader.source(), Some(path.as_path()));
        assert_eq!(reader.total_rows(), 1);
    }
}
