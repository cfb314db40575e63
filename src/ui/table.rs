use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use tijuca_visitors::data::model::Table;
use tijuca_visitors::state::SessionView;

const ROW_HEIGHT: f32 = 18.0;
const TABLE_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Data tables (central panel)
// ---------------------------------------------------------------------------

/// The projected table followed by the filtered one.
pub fn data_tables(ui: &mut Ui, view: &SessionView, filter: Option<String>) {
    ui.label(RichText::new("Selected columns:").strong());
    ui.push_id("projected_table", |ui: &mut Ui| {
        data_table(ui, &view.projected);
    });

    ui.add_space(8.0);

    let caption = match filter {
        Some(filter) => format!("Filtered by {filter} ({} records):", view.filtered.len()),
        None => "The filter column has no values.".to_string(),
    };
    ui.label(RichText::new(caption).strong());
    ui.push_id("filtered_table", |ui: &mut Ui| {
        data_table(ui, &view.filtered);
    });
}

fn data_table(ui: &mut Ui, table: &Table) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(true)
        .max_scroll_height(TABLE_HEIGHT)
        .columns(Column::auto().at_least(60.0), table.columns.len())
        .header(ROW_HEIGHT + 4.0, |mut header| {
            for field in &table.columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(field.name());
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, table.len(), |mut row| {
                let cells = &table.rows[row.index()];
                for cell in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell.to_string());
                    });
                }
            });
        });
}
