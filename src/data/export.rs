use std::io::{Read, Write};

use anyhow::{Context, Result};

use super::model::{Cell, Field, Table};

/// File name offered when saving the filtered table.
pub const EXPORT_FILE_NAME: &str = "dados_filtrados.csv";

/// Media type of the export.
pub const EXPORT_MIME: &str = "text/csv";

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write `table` as comma-separated UTF-8: a header row with the column
/// names in table order, then one line per record, no index column.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(table.columns.iter().map(|f| f.name()))
        .context("writing CSV header")?;

    for (row_no, row) in table.rows.iter().enumerate() {
        csv_writer
            .write_record(row.iter().map(Cell::to_string))
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }

    csv_writer.flush().context("flushing CSV")?;
    Ok(())
}

/// The CSV export as a string.
pub fn to_csv(table: &Table) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    String::from_utf8(buf).context("CSV output is not UTF-8")
}

// ---------------------------------------------------------------------------
// Reading back
// ---------------------------------------------------------------------------

/// Parse an export back into a [`Table`].
///
/// Header names must be known fields. `Sector`, `Segment` and `Category`
/// read back as text; `Total` and the months are inferred with
/// [`Cell::infer`], so text that looks like a number there comes back as a
/// number.
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let columns: Vec<Field> = csv_reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.parse::<Field>())
        .collect::<Result<_, _>>()
        .context("CSV header names an unknown column")?;

    let mut rows = Vec::new();
    for (row_no, result) in csv_reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(
            columns
                .iter()
                .zip(record.iter())
                .map(|(&field, s)| Cell::parse_for(field, s))
                .collect(),
        );
    }

    Ok(Table::new(columns, rows))
}

pub fn parse_csv(text: &str) -> Result<Table> {
    read_csv(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_follows_selection_order() {
        let table = Table::new(
            vec![Field::Total, Field::Sector],
            vec![vec![Cell::Number(1200.0), Cell::from("Paineiras")]],
        );
        assert_eq!(to_csv(&table).unwrap(), "Total,Sector\n1200,Paineiras\n");
    }

    #[test]
    fn quoting_and_empty_cells() {
        let table = Table::new(
            vec![Field::Sector, Field::Category, Field::Total],
            vec![vec![
                Cell::from("Floresta, Pedra Bonita"),
                Cell::Empty,
                Cell::Number(2.5),
            ]],
        );
        let text = to_csv(&table).unwrap();
        assert_eq!(
            text,
            "Sector,Category,Total\n\"Floresta, Pedra Bonita\",,2.5\n"
        );
        assert_eq!(parse_csv(&text).unwrap(), table);
    }

    #[test]
    fn empty_table_is_header_only() {
        let table = Table::new(vec![Field::Sector, Field::Total], Vec::new());
        let text = to_csv(&table).unwrap();
        assert_eq!(text, "Sector,Total\n");
        assert_eq!(parse_csv(&text).unwrap(), table);
    }

    #[test]
    fn numeric_looking_labels_stay_text() {
        let table = Table::new(
            vec![Field::Sector, Field::Category, Field::Total],
            vec![vec![Cell::from("01"), Cell::from("true"), Cell::Number(5.0)]],
        );
        let text = to_csv(&table).unwrap();
        assert_eq!(text, "Sector,Category,Total\n01,true,5\n");
        assert_eq!(parse_csv(&text).unwrap(), table);
    }

    #[test]
    fn unknown_header_is_rejected() {
        assert!(parse_csv("Setor,Total\nPaineiras,1\n").is_err());
    }
}
