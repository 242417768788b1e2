//! Stand-alone window plotting one downloaded waveform.

use crate::instrument::Waveform;
use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

/// A window showing one waveform, titled with its source and acquisition time.
pub struct PlotWindow {
    id: egui::ViewportId,
    title: String,
    waveform: Waveform,
    open: bool,
}

impl PlotWindow {
    pub fn new(id: egui::ViewportId, waveform: Waveform) -> Self {
        let title = format!(
            "{} ({})",
            waveform.label(),
            waveform.acquired_at.format("%H:%M:%S")
        );
        Self {
            id,
            title,
            waveform,
            open: true,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn waveform(&self) -> &Waveform {
        &self.waveform
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        if !self.open {
            return;
        }

        let builder = egui::ViewportBuilder::default()
            .with_title(self.title.clone())
            .with_inner_size([640.0, 360.0]);

        let mut open = self.open;
        ctx.show_viewport_immediate(self.id, builder, |ctx, class| {
            if class == egui::ViewportClass::Embedded {
                egui::Window::new(self.title.clone())
                    .id(egui::Id::new(self.id))
                    .open(&mut open)
                    .default_size([640.0, 360.0])
                    .show(ctx, |ui| self.plot(ui));
                return;
            }

            egui::CentralPanel::default().show(ctx, |ui| self.plot(ui));
            if ctx.input(|i| i.viewport().close_requested()) {
                open = false;
            }
        });
        self.open = open;
    }

    fn plot(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(format!("{} samples", self.waveform.len()));
            if let Some((min, max)) = self.waveform.min_max() {
                ui.separator();
                ui.label(format!("min {:.4} V  max {:.4} V", min, max));
            }
        });

        let line = Line::new(PlotPoints::from(self.waveform.points())).name(self.waveform.label());
        Plot::new(("waveform_plot", self.id))
            .legend(Legend::default())
            .x_axis_label("Time (s)")
            .y_axis_label("Voltage (V)")
            .show(ui, |plot_ui| {
                plot_ui.line(line);
            });
    }
}
