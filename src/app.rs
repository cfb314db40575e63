use eframe::egui;

use tijuca_visitors::state::Session;

use crate::color::Theme;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct VisitorsApp {
    pub session: Session,
    pub theme: Theme,
}

impl eframe::App for VisitorsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.session);
        });

        // ---- Left side panel: year, columns, filter, colours ----
        egui::SidePanel::left("selection_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.session, &mut self.theme);
            });

        // ---- Central panel: tables, metrics, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(view) = self.session.view() else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a workbook to view visitors  (File → Open…)");
                });
                return;
            };

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    let filter = self
                        .session
                        .filter_column
                        .zip(self.session.selected_value.as_ref())
                        .map(|(field, value)| format!("{field} = {value}"));
                    table::data_tables(ui, view, filter);
                    ui.separator();
                    plot::metrics(ui, view);
                    plot::monthly_chart(ui, view);
                    plot::total_histogram(ui, view);
                });
        });
    }
}
