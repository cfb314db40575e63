use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use tijuca_visitors::data::export::EXPORT_FILE_NAME;
use tijuca_visitors::data::model::{Cell, Field};
use tijuca_visitors::data::DataError;
use tijuca_visitors::state::Session;

/// filter-sheet: run the dashboard's selection and filter on a workbook
/// without opening a window.
///
/// Every option defaults the way the dashboard does: the first year sheet,
/// all columns, the first selected column as filter column, and its first
/// value.
#[derive(Debug, Parser)]
#[command(name = "filter-sheet", version)]
struct Args {
    /// Visitor workbook (.xlsx) with one sheet per year.
    workbook: PathBuf,

    /// Year sheet to read, e.g. 2015.
    #[arg(long)]
    sheet: Option<String>,

    /// Comma separated column names, e.g. Sector,Total,January.
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Column to filter on.
    #[arg(long)]
    filter_column: Option<String>,

    /// Value the filter column must equal.
    #[arg(long)]
    value: Option<String>,

    /// Where to write the CSV; stdout when absent. A directory receives
    /// dados_filtrados.csv.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print the Total summary as JSON on stderr.
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut session = Session::default();
    session.open_workbook(&args.workbook)?;

    if let Some(sheet) = &args.sheet {
        if !session.sheets.contains(sheet) {
            return Err(DataError::UnknownSheet(sheet.clone()).into());
        }
        session.select_sheet(sheet);
    }
    if !args.columns.is_empty() {
        session.select_columns_by_name(&args.columns);
    }
    if let Some(name) = &args.filter_column {
        let field: Field = name.parse()?;
        if !session.selected_columns.contains(&field) {
            bail!("filter column {field} is not among the selected columns");
        }
        session.select_filter_column(field);
    }
    if let Some(value) = &args.value {
        let candidate = session
            .view()
            .and_then(|view| view.filter_values.iter().find(|c| c.to_string() == *value))
            .cloned();
        if candidate.is_none() {
            log::warn!("'{value}' is not a value of the filter column, using the first one");
        }
        session.select_filter_value(candidate.unwrap_or_else(|| Cell::infer(value)));
    }

    if let Some(msg) = &session.status_message {
        bail!("{msg}");
    }
    let Some(view) = session.view() else {
        bail!("no columns selected");
    };
    log::info!(
        "Sheet {}: {} records, {} after filtering on {:?} = {:?}",
        view.sheet,
        view.projected.len(),
        view.filtered.len(),
        session.filter_column,
        session.selected_value
    );

    if args.summary {
        match &view.summary {
            Some(summary) => eprintln!("{}", serde_json::to_string_pretty(summary)?),
            None => log::warn!("No summary: Total is not selected or nothing was filtered"),
        }
    }

    let Some(csv) = session.export_csv()? else {
        log::warn!("Nothing to export: the filter column has no values");
        return Ok(());
    };

    match args.output {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(EXPORT_FILE_NAME)
            } else {
                path
            };
            session.save_export(&path)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(csv.as_bytes())
                .context("writing CSV to stdout")?;
        }
    }

    Ok(())
}
