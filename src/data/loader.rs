use std::collections::HashMap;
use std::io::Cursor;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use sha2::{Digest, Sha256};

use super::model::{Cell, Field, Table};
use super::DataError;

/// Leading rows of every sheet holding titles and labels, never data.
pub const BOILERPLATE_ROWS: usize = 5;

/// Sheet names offered for selection.
pub const YEAR_SHEETS: RangeInclusive<u16> = 2007..=2020;

/// Whether a sheet name is one of the selectable years ("2007".."2020").
pub fn is_year_sheet(name: &str) -> bool {
    name.parse::<u16>()
        .map(|year| YEAR_SHEETS.contains(&year) && year.to_string() == name)
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// RawSheet – untyped grid
// ---------------------------------------------------------------------------

/// One worksheet as a rectangular grid of cells, positions as in the sheet
/// (row 0 is the sheet's first row even when it is blank).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub width: usize,
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    /// Build a grid from ragged rows, padding each row to the widest one.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        RawSheet {
            name: name.into(),
            width,
            rows,
        }
    }

    fn from_range(name: &str, range: &Range<Data>) -> Self {
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
        for data_row in range.rows() {
            let mut row = vec![Cell::Empty; col_offset];
            row.extend(data_row.iter().map(convert_cell));
            rows.push(row);
        }
        RawSheet::from_rows(name, rows)
    }
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // Serial day number, as the sheet stores it.
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Turn a raw sheet into a [`Table`] over [`Field::ALL`].
///
/// * rows `0..BOILERPLATE_ROWS` are dropped
/// * columns are named by position; anything right of the 16th is ignored
/// * rows where every field is missing are dropped
///
/// Fails with [`DataError::SchemaMismatch`] when the sheet is narrower than
/// the schema; no partial table is produced.
pub fn normalize(raw: &RawSheet) -> Result<Table, DataError> {
    let expected = Field::ALL.len();
    if raw.width < expected {
        return Err(DataError::SchemaMismatch {
            expected,
            found: raw.width,
        });
    }

    let rows: Vec<Vec<Cell>> = raw
        .rows
        .iter()
        .skip(BOILERPLATE_ROWS)
        .map(|row| row[..expected].to_vec())
        .filter(|row| !row.iter().all(Cell::is_missing))
        .collect();

    Ok(Table::new(Field::ALL.to_vec(), rows))
}

// ---------------------------------------------------------------------------
// Workbook
// ---------------------------------------------------------------------------

/// An opened `.xlsx` file, held in memory and identified by its content.
pub struct Workbook {
    path: PathBuf,
    digest: String,
    sheet_names: Vec<String>,
    reader: Xlsx<Cursor<Vec<u8>>>,
}

impl std::fmt::Debug for Workbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbook")
            .field("path", &self.path)
            .field("digest", &self.digest)
            .field("sheet_names", &self.sheet_names)
            .finish()
    }
}

impl Workbook {
    /// Read and open a workbook from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_bytes(path, bytes)
    }

    /// Open a workbook from its raw bytes; `path` is only used for display.
    pub fn from_bytes(path: &Path, bytes: Vec<u8>) -> Result<Self> {
        let digest = content_digest(&bytes);
        let reader: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
            .map_err(|e| anyhow!("opening {} as .xlsx: {e}", path.display()))?;
        let sheet_names = reader.sheet_names().to_vec();

        log::info!(
            "Opened workbook {} ({} sheets, digest {})",
            path.display(),
            sheet_names.len(),
            &digest[..12]
        );

        Ok(Workbook {
            path: path.to_path_buf(),
            digest,
            sheet_names,
            reader,
        })
    }
}

// ---------------------------------------------------------------------------
// SheetSource – where year sheets come from
// ---------------------------------------------------------------------------

/// Anything that can hand out year sheets as raw grids.
pub trait SheetSource {
    /// Identity of the underlying content, used as the cache key.
    fn digest(&self) -> &str;

    /// Human readable name (file name) for status lines.
    fn label(&self) -> String;

    /// Selectable year sheets in source order.
    fn year_sheets(&self) -> Vec<String>;

    fn raw_sheet(&mut self, name: &str) -> Result<RawSheet>;
}

impl SheetSource for Workbook {
    /// SHA-256 of the file contents, hex encoded.
    fn digest(&self) -> &str {
        &self.digest
    }

    fn label(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn year_sheets(&self) -> Vec<String> {
        self.sheet_names
            .iter()
            .filter(|name| is_year_sheet(name))
            .cloned()
            .collect()
    }

    fn raw_sheet(&mut self, name: &str) -> Result<RawSheet> {
        if !is_year_sheet(name) || !self.sheet_names.iter().any(|s| s == name) {
            return Err(DataError::UnknownSheet(name.to_string()).into());
        }
        let range = self
            .reader
            .worksheet_range(name)
            .map_err(|e| anyhow!("reading sheet '{name}': {e}"))?;
        Ok(RawSheet::from_range(name, &range))
    }
}

fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Cache of normalized sheets
// ---------------------------------------------------------------------------

/// Normalized tables keyed by (workbook digest, sheet name).
#[derive(Debug, Default)]
pub struct SheetCache {
    tables: HashMap<(String, String), Arc<Table>>,
}

impl SheetCache {
    /// Return the normalized table for `sheet`, reading it on first use.
    pub fn get_or_load<S>(&mut self, source: &mut S, sheet: &str) -> Result<Arc<Table>>
    where
        S: SheetSource + ?Sized,
    {
        let key = (source.digest().to_string(), sheet.to_string());
        if let Some(table) = self.tables.get(&key) {
            log::debug!("Sheet '{sheet}' served from cache");
            return Ok(Arc::clone(table));
        }

        let raw = source.raw_sheet(sheet)?;
        let table = Arc::new(
            normalize(&raw).with_context(|| format!("normalizing sheet '{sheet}'"))?,
        );
        log::info!("Loaded sheet '{sheet}': {} records", table.len());
        self.tables.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Store an already normalized table.
    pub fn insert(&mut self, digest: &str, sheet: &str, table: Table) -> Arc<Table> {
        let table = Arc::new(table);
        self.tables
            .insert((digest.to_string(), sheet.to_string()), Arc::clone(&table));
        table
    }

    pub fn get(&self, digest: &str, sheet: &str) -> Option<Arc<Table>> {
        self.tables
            .get(&(digest.to_string(), sheet.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_row(sector: &str, total: f64) -> Vec<Cell> {
        let mut row = vec![
            Cell::from(sector),
            Cell::from("Visitação"),
            Cell::from("Pagantes"),
            Cell::Number(total),
        ];
        row.extend((1..=12).map(|m| Cell::Number(m as f64)));
        row
    }

    fn boilerplate() -> Vec<Vec<Cell>> {
        vec![
            vec![Cell::from("Parque Nacional da Tijuca")],
            vec![],
            vec![Cell::from("Visitantes por setor")],
            vec![],
            vec![Cell::from("Setor"), Cell::from("Segmento")],
        ]
    }

    #[test]
    fn year_sheet_names() {
        assert!(is_year_sheet("2007"));
        assert!(is_year_sheet("2020"));
        assert!(!is_year_sheet("2006"));
        assert!(!is_year_sheet("2021"));
        assert!(!is_year_sheet("02010"));
        assert!(!is_year_sheet("Resumo"));
    }

    #[test]
    fn normalize_drops_boilerplate_and_empty_rows() {
        let mut rows = boilerplate();
        rows.push(data_row("Paineiras", 100.0));
        rows.push(vec![Cell::Empty; 16]);
        rows.push(data_row("Corcovado", 250.0));
        rows.push(vec![]);
        let raw = RawSheet::from_rows("2015", rows);

        let table = normalize(&raw).unwrap();
        assert_eq!(table.columns, Field::ALL.to_vec());
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], Cell::from("Paineiras"));
        assert_eq!(table.rows[1][3], Cell::Number(250.0));
        assert!(table
            .rows
            .iter()
            .all(|row| row.len() == 16 && !row.iter().all(Cell::is_missing)));
    }

    #[test]
    fn normalize_truncates_extra_columns() {
        let mut rows = boilerplate();
        let mut row = data_row("Paineiras", 100.0);
        row.push(Cell::from("nota de rodapé"));
        rows.push(row);
        let table = normalize(&RawSheet::from_rows("2010", rows)).unwrap();
        assert_eq!(table.rows[0].len(), 16);
    }

    #[test]
    fn row_only_populated_beyond_schema_is_empty() {
        let mut rows = boilerplate();
        let mut row = vec![Cell::Empty; 16];
        row.push(Cell::from("observação"));
        rows.push(row);
        rows.push(data_row("Paineiras", 1.0));
        let table = normalize(&RawSheet::from_rows("2010", rows)).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn narrow_sheet_is_schema_mismatch() {
        let mut rows = boilerplate();
        rows.push(vec![Cell::from("Paineiras"), Cell::Number(1.0)]);
        let err = normalize(&RawSheet::from_rows("2012", rows)).unwrap_err();
        assert_eq!(
            err,
            DataError::SchemaMismatch {
                expected: 16,
                found: 2
            }
        );
    }

    #[test]
    fn boilerplate_only_sheet_is_empty() {
        let mut rows = boilerplate();
        rows[0].resize(16, Cell::Empty);
        let table = normalize(&RawSheet::from_rows("2008", rows)).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 16);
    }

    #[test]
    fn cache_is_keyed_by_digest_and_sheet() {
        let mut cache = SheetCache::default();
        let table = Table::new(Field::ALL.to_vec(), vec![data_row("Paineiras", 5.0)]);
        cache.insert("abc", "2019", table.clone());

        assert_eq!(cache.get("abc", "2019").as_deref(), Some(&table));
        assert!(cache.get("abc", "2020").is_none());
        assert!(cache.get("def", "2019").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn digest_is_hex_sha256() {
        let digest = content_digest(b"");
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
