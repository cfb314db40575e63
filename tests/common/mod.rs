#![allow(dead_code)]

use anyhow::Result;

use tijuca_visitors::data::loader::{RawSheet, SheetSource};
use tijuca_visitors::data::model::Cell;
use tijuca_visitors::data::DataError;

/// Year sheets held in memory, counting reads so caching can be observed.
pub struct MemorySource {
    pub digest: String,
    pub sheets: Vec<RawSheet>,
    pub reads: std::rc::Rc<std::cell::Cell<usize>>,
}

impl MemorySource {
    pub fn new(digest: &str, sheets: Vec<RawSheet>) -> Self {
        Self {
            digest: digest.to_string(),
            sheets,
            reads: Default::default(),
        }
    }
}

impl SheetSource for MemorySource {
    fn digest(&self) -> &str {
        &self.digest
    }

    fn label(&self) -> String {
        format!("memory:{}", self.digest)
    }

    fn year_sheets(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn raw_sheet(&mut self, name: &str) -> Result<RawSheet> {
        self.reads.set(self.reads.get() + 1);
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| DataError::UnknownSheet(name.to_string()).into())
    }
}

pub fn boilerplate() -> Vec<Vec<Cell>> {
    vec![
        vec![Cell::from("Parque Nacional da Tijuca")],
        vec![Cell::from("Visitação anual")],
        vec![],
        vec![Cell::from("Fonte: ICMBio")],
        vec![
            Cell::from("Setor"),
            Cell::from("Segmento"),
            Cell::from("Categoria"),
            Cell::from("Total"),
        ],
    ]
}

/// One data row: descriptive columns, a total and twelve monthly counts.
pub fn visitor_row(sector: &str, segment: &str, category: &str, base: f64) -> Vec<Cell> {
    let months: Vec<f64> = (1..=12).map(|m| base + m as f64).collect();
    let mut row = vec![
        Cell::from(sector),
        Cell::from(segment),
        Cell::from(category),
        Cell::Number(months.iter().sum()),
    ];
    row.extend(months.into_iter().map(Cell::Number));
    row
}

/// A sheet with `data_rows` visitor rows followed by the seven trailing
/// summary rows the source workbooks carry.
pub fn year_sheet(name: &str, data_rows: &[(&str, &str, &str, f64)]) -> RawSheet {
    let mut rows = boilerplate();
    for &(sector, segment, category, base) in data_rows {
        rows.push(visitor_row(sector, segment, category, base));
    }
    rows.push(vec![Cell::Empty; 16]);
    for i in 0..7 {
        let mut note = vec![Cell::from("Total geral"), Cell::Empty, Cell::Empty];
        note.push(Cell::Number(1000.0 * (i + 1) as f64));
        rows.push(note);
    }
    RawSheet::from_rows(name, rows)
}

pub fn standard_rows() -> Vec<(&'static str, &'static str, &'static str, f64)> {
    vec![
        ("Paineiras", "Visitação", "Pagantes", 100.0),
        ("Corcovado", "Visitação", "Pagantes", 500.0),
        ("Paineiras", "Visitação", "Isentos", 10.0),
        ("Floresta", "Trilhas", "Isentos", 50.0),
        ("Corcovado", "Visitação", "Isentos", 40.0),
    ]
}
