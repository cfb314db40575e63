use std::path::{Path, PathBuf};

use tijuca_visitors::data::loader::{normalize, SheetSource, Workbook};
use tijuca_visitors::data::model::{Cell, Field};
use tijuca_visitors::state::Session;
use umya_spreadsheet::{new_file, writer, Worksheet};

const MONTHS: usize = 12;

/// Fill one data row (1-based `row`) starting in column A.
fn write_visitor_row(sheet: &mut Worksheet, row: u32, sector: &str, total: f64) {
    sheet.get_cell_mut((1, row)).set_value_string(sector);
    sheet.get_cell_mut((2, row)).set_value_string("Visitação");
    sheet.get_cell_mut((3, row)).set_value_string("Pagantes");
    sheet.get_cell_mut((4, row)).set_value_number(total);
    for m in 0..MONTHS as u32 {
        sheet
            .get_cell_mut((5 + m, row))
            .set_value_number(total / MONTHS as f64);
    }
}

/// Workbook with the default "Sheet1", a year sheet whose first used cell is
/// A3, a "Resumo" sheet and a year sheet laid out from A1.
fn build_workbook(dir: &Path) -> PathBuf {
    let mut book = new_file();

    {
        let sheet = book.new_sheet("2015").unwrap();
        sheet.get_cell_mut((1, 3)).set_value_string("Parque Nacional da Tijuca");
        sheet.get_cell_mut((1, 5)).set_value_string("Setor");
        write_visitor_row(sheet, 6, "Paineiras", 1200.0);
        write_visitor_row(sheet, 7, "Corcovado", 2400.0);
    }
    {
        let sheet = book.new_sheet("Resumo").unwrap();
        sheet.get_cell_mut((1, 1)).set_value_string("Totais por ano");
    }
    {
        let sheet = book.new_sheet("2016").unwrap();
        for row in 1..=5 {
            sheet
                .get_cell_mut((1, row))
                .set_value_string(format!("cabeçalho {row}"));
        }
        write_visitor_row(sheet, 6, "Floresta", 360.0);
        write_visitor_row(sheet, 8, "Paineiras", 600.0);
    }

    let path = dir.join("visitantes.xlsx");
    writer::xlsx::write(&book, &path).unwrap();
    path
}

#[test]
fn only_year_sheets_are_offered() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = Workbook::open(&build_workbook(dir.path())).unwrap();
    assert_eq!(workbook.year_sheets(), vec!["2015", "2016"]);
    assert_eq!(workbook.label(), "visitantes.xlsx");
    assert_eq!(workbook.digest().len(), 64);
}

#[test]
fn grid_is_padded_back_to_a1() {
    let dir = tempfile::tempdir().unwrap();
    let mut workbook = Workbook::open(&build_workbook(dir.path())).unwrap();

    let raw = workbook.raw_sheet("2015").unwrap();
    assert_eq!(raw.rows.len(), 7);
    assert_eq!(raw.width, 16);
    assert!(raw.rows[0].iter().all(|c| *c == Cell::Empty));
    assert_eq!(raw.rows[2][0], Cell::from("Parque Nacional da Tijuca"));

    let table = normalize(&raw).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows[0][0], Cell::from("Paineiras"));
    assert_eq!(table.rows[0][1], Cell::from("Visitação"));
    assert_eq!(table.rows[1][3], Cell::Number(2400.0));
    assert_eq!(table.rows[1][4], Cell::Number(200.0));
}

#[test]
fn blank_rows_inside_data_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let mut workbook = Workbook::open(&build_workbook(dir.path())).unwrap();

    let table = normalize(&workbook.raw_sheet("2016").unwrap()).unwrap();
    let sectors: Vec<Cell> = table.column(Field::Sector).unwrap().cloned().collect();
    assert_eq!(sectors, vec![Cell::from("Floresta"), Cell::from("Paineiras")]);
}

#[test]
fn non_year_sheets_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut workbook = Workbook::open(&build_workbook(dir.path())).unwrap();

    for name in ["Resumo", "Sheet1", "2019"] {
        let err = workbook.raw_sheet(name).unwrap_err();
        assert!(err.to_string().contains(name), "{name}: {err}");
    }
}

#[test]
fn same_bytes_give_same_digest() {
    let dir = tempfile::tempdir().unwrap();
    let path = build_workbook(dir.path());
    let copy = dir.path().join("copia.xlsx");
    std::fs::copy(&path, &copy).unwrap();

    let a = Workbook::open(&path).unwrap();
    let b = Workbook::open(&copy).unwrap();
    assert_eq!(a.digest(), b.digest());
}

#[test]
fn non_workbook_file_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dados.xlsx");
    std::fs::write(&path, "Setor,Total\nPaineiras,1\n").unwrap();

    let err = Workbook::open(&path).unwrap_err();
    assert!(format!("{err:#}").contains("dados.xlsx"));
    assert!(Workbook::open(&dir.path().join("ausente.xlsx")).is_err());
}

#[test]
fn session_reads_real_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::default();
    session
        .open_workbook(&build_workbook(dir.path()))
        .unwrap();

    assert_eq!(session.selected_sheet.as_deref(), Some("2015"));
    session.select_filter_value(Cell::from("Corcovado"));

    let view = session.view().unwrap();
    assert_eq!(view.projected.len(), 2);
    assert_eq!(view.filtered.len(), 1);
    assert_eq!(view.summary.as_ref().map(|s| s.sum), Some(2400.0));

    session.select_sheet("2016");
    assert_eq!(session.view().unwrap().filter_values.len(), 2);
}
