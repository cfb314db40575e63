use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::data::export;
use crate::data::export::EXPORT_MIME;
use crate::data::filter::{apply, drop_trailing_summary, project, FilterOutcome, FilterSpec};
use crate::data::loader::{SheetCache, SheetSource, Workbook};
use crate::data::model::{Cell, Field, Table};
use crate::data::stats::{
    series_for, summarize, Histogram, MonthlySeries, TotalSummary, HISTOGRAM_BINS,
};
use crate::data::DataError;

// ---------------------------------------------------------------------------
// Interaction stages
// ---------------------------------------------------------------------------

/// Where a session is in the open → choose → filter → export flow.
///
/// Defaults are applied as soon as a sheet loads: choosing columns also
/// chooses a filter column, and choosing a value also filters. A session whose
/// filter column has no values stays at `FilterChosen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NoFile,
    /// A sheet is chosen but nothing is shown (load error or no columns).
    SheetChosen,
    FilterChosen,
    Filtered,
    Exported,
}

// ---------------------------------------------------------------------------
// Derived view
// ---------------------------------------------------------------------------

/// Everything the dashboard shows for the current choices.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub sheet: String,
    /// Selected columns, trailing summary rows removed.
    pub projected: Table,
    /// Candidate values of the filter column, first-seen order.
    pub filter_values: Vec<Cell>,
    /// Records matching the filter; empty when there is nothing to filter on.
    pub filtered: Table,
    /// Present when `Total` is selected and a value was resolved.
    pub summary: Option<TotalSummary>,
    pub series: MonthlySeries,
    pub histogram: Histogram,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// One user's choices over one opened workbook, independent of rendering.
///
/// Every setter recomputes the view; earlier choices that are no longer valid
/// fall back to their first available alternative.
pub struct Session {
    source: Option<Box<dyn SheetSource>>,
    cache: SheetCache,

    /// Year sheets offered by the open source.
    pub sheets: Vec<String>,
    pub selected_sheet: Option<String>,
    pub selected_columns: Vec<Field>,
    pub filter_column: Option<Field>,
    pub selected_value: Option<Cell>,

    view: Option<SessionView>,
    exported: bool,

    /// Error shown to the user; cleared by the next successful recompute.
    pub status_message: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            source: None,
            cache: SheetCache::default(),
            sheets: Vec::new(),
            selected_sheet: None,
            selected_columns: Field::ALL.to_vec(),
            filter_column: None,
            selected_value: None,
            view: None,
            exported: false,
            status_message: None,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("source", &self.source.as_ref().map(|s| s.label()))
            .field("selected_sheet", &self.selected_sheet)
            .field("selected_columns", &self.selected_columns)
            .field("filter_column", &self.filter_column)
            .field("selected_value", &self.selected_value)
            .field("stage", &self.stage())
            .finish()
    }
}

impl Session {
    /// Open an `.xlsx` file and make it the session's source.
    pub fn open_workbook(&mut self, path: &Path) -> Result<()> {
        let workbook = Workbook::open(path)?;
        self.open_source(Box::new(workbook));
        Ok(())
    }

    /// Replace the source. The chosen sheet survives when the new source has
    /// it; otherwise the first year sheet is chosen.
    pub fn open_source(&mut self, source: Box<dyn SheetSource>) {
        self.sheets = source.year_sheets();
        log::info!(
            "Opened {} with year sheets {:?}",
            source.label(),
            self.sheets
        );
        self.source = Some(source);

        let keep = self
            .selected_sheet
            .as_ref()
            .is_some_and(|s| self.sheets.contains(s));
        if !keep {
            self.selected_sheet = self.sheets.first().cloned();
        }
        self.recompute();
    }

    /// Label of the open source, if any.
    pub fn source_label(&self) -> Option<String> {
        self.source.as_ref().map(|s| s.label())
    }

    /// Choose a year sheet; names the source does not offer are ignored.
    pub fn select_sheet(&mut self, name: &str) {
        if !self.sheets.iter().any(|s| s == name) {
            log::warn!("Ignoring unknown sheet '{name}'");
            return;
        }
        self.selected_sheet = Some(name.to_string());
        self.recompute();
    }

    /// Choose the projected columns, in order. Duplicates are dropped.
    pub fn select_columns(&mut self, columns: &[Field]) {
        let mut unique: Vec<Field> = Vec::with_capacity(columns.len());
        for &field in columns {
            if !unique.contains(&field) {
                unique.push(field);
            }
        }
        self.selected_columns = unique;
        self.recompute();
    }

    /// Choose columns by name. A stale name resets the selection to all
    /// columns instead of failing.
    pub fn select_columns_by_name<S: AsRef<str>>(&mut self, names: &[S]) {
        let parsed: Result<Vec<Field>, DataError> =
            names.iter().map(|n| n.as_ref().parse::<Field>()).collect();
        match parsed {
            Ok(columns) => self.select_columns(&columns),
            Err(e) => {
                log::warn!("Resetting column selection: {e}");
                self.select_columns(&Field::ALL);
            }
        }
    }

    /// Add or remove one column, keeping schema order.
    pub fn toggle_column(&mut self, field: Field) {
        let columns: Vec<Field> = if self.selected_columns.contains(&field) {
            self.selected_columns
                .iter()
                .copied()
                .filter(|f| *f != field)
                .collect()
        } else {
            Field::ALL
                .iter()
                .copied()
                .filter(|f| *f == field || self.selected_columns.contains(f))
                .collect()
        };
        self.select_columns(&columns);
    }

    pub fn select_filter_column(&mut self, field: Field) {
        self.filter_column = Some(field);
        self.recompute();
    }

    pub fn select_filter_value(&mut self, value: Cell) {
        self.selected_value = Some(value);
        self.recompute();
    }

    pub fn view(&self) -> Option<&SessionView> {
        self.view.as_ref()
    }

    pub fn stage(&self) -> Stage {
        if self.source.is_none() {
            return Stage::NoFile;
        }
        match &self.view {
            None if self.selected_sheet.is_some() => Stage::SheetChosen,
            None => Stage::NoFile,
            Some(_) if self.selected_value.is_none() => Stage::FilterChosen,
            Some(_) if self.exported => Stage::Exported,
            Some(_) => Stage::Filtered,
        }
    }

    /// CSV of the filtered table; `None` when no value could be resolved.
    pub fn export_csv(&self) -> Result<Option<String>> {
        match (&self.view, &self.selected_value) {
            (Some(view), Some(_)) => export::to_csv(&view.filtered).map(Some),
            _ => Ok(None),
        }
    }

    /// Write the CSV export to `path`. Returns `false` when there was
    /// nothing to export.
    pub fn save_export(&mut self, path: &Path) -> Result<bool> {
        let Some(csv) = self.export_csv()? else {
            return Ok(false);
        };
        std::fs::write(path, csv).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported filtered table to {} ({EXPORT_MIME})", path.display());
        self.exported = true;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Recompute
    // -----------------------------------------------------------------------

    /// Rebuild the view from the current choices.
    pub fn recompute(&mut self) {
        self.view = None;
        self.exported = false;

        let (Some(source), Some(sheet)) = (self.source.as_mut(), self.selected_sheet.clone())
        else {
            return;
        };

        let table = match self.cache.get_or_load(&mut **source, &sheet) {
            Ok(table) => table,
            Err(e) => {
                log::error!("Failed to load sheet '{sheet}': {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                return;
            }
        };
        self.status_message = None;

        if self.selected_columns.is_empty() {
            log::debug!("No columns selected");
            return;
        }

        let view = self.build_view(sheet, &table);
        log::debug!(
            "Recomputed view: {} projected, {} filtered",
            view.projected.len(),
            view.filtered.len()
        );
        self.view = Some(view);
    }

    fn build_view(&mut self, sheet: String, table: &Arc<Table>) -> SessionView {
        let projected = match project(table, &self.selected_columns) {
            Ok(projected) => projected,
            Err(e) => {
                log::warn!("Resetting column selection: {e}");
                self.selected_columns = table.columns.clone();
                table.as_ref().clone()
            }
        };
        let projected = drop_trailing_summary(projected);

        // Non-empty: checked by the caller or reset to the full schema.
        let first_column = projected.columns[0];
        let filter_column = match self.filter_column {
            Some(field) if projected.has_column(field) => field,
            _ => first_column,
        };
        self.filter_column = Some(filter_column);

        let spec = FilterSpec {
            field: filter_column,
            value: self.selected_value.clone().unwrap_or_default(),
        };
        let outcome = apply(&projected, &spec).unwrap_or_else(|_| FilterOutcome {
            table: Table::new(projected.columns.clone(), Vec::new()),
            value: None,
            candidates: Vec::new(),
        });
        self.selected_value = outcome.value;
        let filtered = outcome.table;
        let filter_values = outcome.candidates;

        let (summary, series) = if self.selected_value.is_some() {
            (summarize(&filtered), series_for(&filtered))
        } else {
            (None, MonthlySeries::default())
        };
        let histogram = Histogram::from_values(&series.totals, HISTOGRAM_BINS);

        SessionView {
            sheet,
            projected,
            filter_values,
            filtered,
            summary,
            series,
            histogram,
        }
    }
}
