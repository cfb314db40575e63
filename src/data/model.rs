use std::fmt;
use std::str::FromStr;

use super::DataError;

// ---------------------------------------------------------------------------
// Cell – a single spreadsheet value
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as it comes out of a worksheet.
/// Used as a filter key and compared for equality, so `Cell` must be `Eq`.
#[derive(Debug, Clone, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

// -- Manual Eq/Hash so filter candidates can be deduplicated --

/// Numbers compare by value except that every NaN equals every other NaN,
/// keeping `Eq` reflexive.
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Empty, Cell::Empty) => true,
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Number(a), Cell::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Cell::Bool(a), Cell::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Text(s) => s.hash(state),
            // 0.0 == -0.0, so they must hash alike.
            Cell::Number(f) if *f == 0.0 => 0u64.hash(state),
            Cell::Number(f) if f.is_nan() => f64::NAN.to_bits().hash(state),
            Cell::Number(f) => f.to_bits().hash(state),
            Cell::Bool(b) => b.hash(state),
            Cell::Empty => {}
        }
    }
}

/// Renders the value the way it is written to CSV: numbers in shortest
/// round-trip form, empty cells as nothing.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl Cell {
    /// Missing values never take part in filtering or aggregation.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(v) => v.is_nan(),
            Cell::Text(_) | Cell::Bool(_) => false,
        }
    }

    /// Numeric coercion: numbers pass through, text is parsed after trimming,
    /// everything else is missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if !v.is_nan() => Some(*v),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
            _ => None,
        }
    }

    /// Read a CSV field of `field`: label columns stay text, count columns
    /// are inferred.
    pub fn parse_for(field: Field, s: &str) -> Cell {
        if s.is_empty() {
            Cell::Empty
        } else if field.is_text() {
            Cell::Text(s.to_string())
        } else {
            Cell::infer(s)
        }
    }

    /// Infer a cell from a text field (CSV import).
    pub fn infer(s: &str) -> Cell {
        if s.is_empty() {
            return Cell::Empty;
        }
        if let Ok(v) = s.parse::<f64>() {
            return Cell::Number(v);
        }
        if s == "true" || s == "false" {
            return Cell::Bool(s == "true");
        }
        Cell::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Field – the fixed positional schema
// ---------------------------------------------------------------------------

/// The sixteen columns of a visitor sheet, in sheet order.
///
/// Names are assigned by position, never read from the header rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Sector,
    Segment,
    Category,
    Total,
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::Sector,
        Field::Segment,
        Field::Category,
        Field::Total,
        Field::January,
        Field::February,
        Field::March,
        Field::April,
        Field::May,
        Field::June,
        Field::July,
        Field::August,
        Field::September,
        Field::October,
        Field::November,
        Field::December,
    ];

    pub const MONTHS: [Field; 12] = [
        Field::January,
        Field::February,
        Field::March,
        Field::April,
        Field::May,
        Field::June,
        Field::July,
        Field::August,
        Field::September,
        Field::October,
        Field::November,
        Field::December,
    ];

    /// Label columns; everything else holds counts.
    pub fn is_text(self) -> bool {
        matches!(self, Field::Sector | Field::Segment | Field::Category)
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Sector => "Sector",
            Field::Segment => "Segment",
            Field::Category => "Category",
            Field::Total => "Total",
            Field::January => "January",
            Field::February => "February",
            Field::March => "March",
            Field::April => "April",
            Field::May => "May",
            Field::June => "June",
            Field::July => "July",
            Field::August => "August",
            Field::September => "September",
            Field::October => "October",
            Field::November => "November",
            Field::December => "December",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| DataError::UnknownField(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Table – ordered records over a (sub-)schema
// ---------------------------------------------------------------------------

/// Rows of cells lined up with `columns`.
///
/// A freshly loaded sheet carries all of [`Field::ALL`]; projections carry a
/// subset in selection order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<Field>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<Field>, rows: Vec<Vec<Cell>>) -> Self {
        Table { columns, rows }
    }

    /// Position of `field` in this table's schema.
    pub fn column_index(&self, field: Field) -> Option<usize> {
        self.columns.iter().position(|c| *c == field)
    }

    pub fn has_column(&self, field: Field) -> bool {
        self.column_index(field).is_some()
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, field: Field) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(field)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
