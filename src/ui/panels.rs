use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use tijuca_visitors::data::export::EXPORT_FILE_NAME;
use tijuca_visitors::data::model::{Cell, Field};
use tijuca_visitors::state::Session;

use crate::color::Theme;

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, session: &mut Session, theme: &mut Theme) {
    ui.heading("Visitors");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            colour_pickers(ui, theme);
            ui.separator();

            if session.source_label().is_none() {
                ui.label("No workbook loaded.");
                return;
            }

            sheet_selector(ui, session);
            ui.separator();
            column_selector(ui, session);
            ui.separator();
            filter_selectors(ui, session);
        });
}

fn colour_pickers(ui: &mut Ui, theme: &mut Theme) {
    ui.strong("Colours");
    ui.horizontal(|ui: &mut Ui| {
        ui.color_edit_button_srgba(&mut theme.background);
        ui.label("Background");
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.color_edit_button_srgba(&mut theme.font);
        ui.label("Font");
    });
}

fn sheet_selector(ui: &mut Ui, session: &mut Session) {
    ui.strong("Year");
    if session.sheets.is_empty() {
        ui.label("The workbook has no sheets named 2007–2020.");
        return;
    }

    let sheets = session.sheets.clone();
    let current = session.selected_sheet.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("year_sheet")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for sheet in &sheets {
                if ui.selectable_label(current == *sheet, sheet).clicked() && current != *sheet {
                    session.select_sheet(sheet);
                }
            }
        });
}

fn column_selector(ui: &mut Ui, session: &mut Session) {
    let header_text = format!(
        "Columns  ({}/{})",
        session.selected_columns.len(),
        Field::ALL.len()
    );

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt("columns")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    session.select_columns(&Field::ALL);
                }
                if ui.small_button("None").clicked() {
                    session.select_columns(&[]);
                }
            });

            for field in Field::ALL {
                let mut checked = session.selected_columns.contains(&field);
                if ui.checkbox(&mut checked, field.name()).changed() {
                    session.toggle_column(field);
                }
            }
        });
}

fn filter_selectors(ui: &mut Ui, session: &mut Session) {
    let Some(view) = session.view() else {
        ui.label("Select at least one column.");
        return;
    };
    let columns = view.projected.columns.clone();
    let values = view.filter_values.clone();

    ui.strong("Filter column");
    let current_column = session.filter_column;
    egui::ComboBox::from_id_salt("filter_column")
        .selected_text(current_column.map(Field::name).unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for field in &columns {
                let selected = current_column == Some(*field);
                if ui.selectable_label(selected, field.name()).clicked() && !selected {
                    session.select_filter_column(*field);
                }
            }
        });

    ui.add_space(4.0);
    ui.strong("Filter value");
    if values.is_empty() {
        ui.label("The column has no values.");
        return;
    }

    let current_value = session.selected_value.clone();
    egui::ComboBox::from_id_salt("filter_value")
        .selected_text(current_value.as_ref().map(cell_label).unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            ScrollArea::vertical()
                .max_height(300.0)
                .show(ui, |ui: &mut Ui| {
                    for value in &values {
                        let selected = current_value.as_ref() == Some(value);
                        if ui.selectable_label(selected, cell_label(value)).clicked() && !selected
                        {
                            session.select_filter_value(value.clone());
                        }
                    }
                });
        });
}

fn cell_label(cell: &Cell) -> String {
    match cell {
        Cell::Empty => "<empty>".to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, session: &mut Session) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(session);
                ui.close_menu();
            }

            let can_export = session.view().is_some() && session.selected_value.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Download filtered CSV…"))
                .clicked()
            {
                save_file_dialog(session);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(label) = session.source_label() {
            ui.label(label);
        }
        if let Some(view) = session.view() {
            ui.label(format!(
                "{}: {} records, {} filtered",
                view.sheet,
                view.projected.len(),
                view.filtered.len()
            ));
        }

        if let Some(msg) = &session.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(session: &mut Session) {
    let file = rfd::FileDialog::new()
        .set_title("Open visitor workbook")
        .add_filter("Excel workbook", &["xlsx"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = session.open_workbook(&path) {
            log::error!("Failed to open workbook: {e:#}");
            session.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn save_file_dialog(session: &mut Session) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data")
        .add_filter("CSV", &["csv"])
        .set_file_name(EXPORT_FILE_NAME)
        .save_file();

    if let Some(path) = file {
        if let Err(e) = session.save_export(&path) {
            log::error!("Failed to export CSV: {e:#}");
            session.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
