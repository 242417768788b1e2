//! Control window for one oscilloscope.
//!
//! The window is bound to a single instrument address for its whole lifetime. It keeps
//! the currently selected channel and downloads that channel's waveform on request.
//! Every successful download opens its own [`PlotWindow`].

use crate::error::{AppError, AppResult};
use crate::gui::actions::{
    OnClick, OnSelectionChanged, ScopeAction, CHANNEL_SELECTOR, DOWNLOAD_WAVEFORM,
};
use crate::gui::plot_window::PlotWindow;
use crate::gui::toast::Toasts;
use crate::instrument::{InstrumentDirectory, Waveform};
use eframe::egui;
use tracing::{debug, info, warn};

/// Channel selected when a window opens.
pub const DEFAULT_CHANNEL: u8 = 1;

/// One open control window, bound to the instrument at `address`.
pub struct ScopeControlWindow {
    id: u64,
    address: String,
    selected_channel: u8,
    open: bool,
    plots: Vec<PlotWindow>,
    next_plot_id: u64,
    toasts: Toasts,
}

impl ScopeControlWindow {
    pub fn new(id: u64, address: impl Into<String>) -> Self {
        let address = address.into();
        info!(address = %address, "Opening scope control window");
        Self {
            id,
            address,
            selected_channel: DEFAULT_CHANNEL,
            open: true,
            plots: Vec::new(),
            next_plot_id: 0,
            toasts: Toasts::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn title(&self) -> String {
        format!("Scope Control: {}", self.address)
    }

    pub fn selected_channel(&self) -> u8 {
        self.selected_channel
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn plots(&self) -> &[PlotWindow] {
        &self.plots
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    /// Sets the channel from a drop-down option ("1" to "8").
    pub fn select_channel(&mut self, option: &str) -> AppResult<()> {
        if !CHANNEL_SELECTOR.options.contains(&option) {
            return Err(AppError::InvalidChannel(option.to_string()));
        }
        self.selected_channel = option
            .parse()
            .map_err(|_| AppError::InvalidChannel(option.to_string()))?;
        Ok(())
    }

    /// Opens the instrument, selects the current channel and fetches its trace.
    pub fn download_waveform(&mut self, directory: &dyn InstrumentDirectory) -> AppResult<()> {
        let waveform = self
            .acquire(directory)
            .map_err(|e| AppError::acquisition(self.address.clone(), e))?;

        info!(
            address = %self.address,
            channel = waveform.channel,
            samples = waveform.len(),
            "Waveform downloaded"
        );

        let plot_id = egui::ViewportId::from_hash_of(("waveform", self.id, self.next_plot_id));
        self.next_plot_id += 1;
        self.plots.push(PlotWindow::new(plot_id, waveform));
        Ok(())
    }

    fn acquire(&self, directory: &dyn InstrumentDirectory) -> AppResult<Waveform> {
        info!(
            address = %self.address,
            channel = self.selected_channel,
            "Requesting waveform"
        );
        let mut scope = directory.oscilloscope(&self.address)?;
        debug!(address = scope.address(), "Instrument session open");
        let mut channel = scope.channel(self.selected_channel)?;
        channel.get_waveform()
    }

    pub fn dispatch(
        &mut self,
        action: ScopeAction,
        directory: &dyn InstrumentDirectory,
    ) -> AppResult<()> {
        match action {
            ScopeAction::SelectChannel(option) => self.select_channel(&option),
            ScopeAction::DownloadWaveform => self.download_waveform(directory),
        }
    }

    /// Runs `action`, reporting any failure as a notification in this window.
    pub fn handle(&mut self, action: ScopeAction, directory: &dyn InstrumentDirectory) {
        if let Err(e) = self.dispatch(action, directory) {
            warn!(address = %self.address, error = %e, "Scope action failed");
            self.toasts.report(&e);
        }
    }

    /// Draws the window and its plots, returning the actions raised this frame.
    pub fn show(&mut self, ctx: &egui::Context) -> Vec<ScopeAction> {
        if !self.open {
            return Vec::new();
        }

        let viewport_id = egui::ViewportId::from_hash_of(("scope_control", self.id));
        let builder = egui::ViewportBuilder::default()
            .with_title(self.title())
            .with_inner_size([320.0, 140.0]);

        let title = self.title();
        let id = self.id;
        let address = self.address.as_str();
        let selected = self.selected_channel;
        let toasts = &mut self.toasts;
        let mut open = self.open;
        let actions = ctx.show_viewport_immediate(viewport_id, builder, |ctx, class| {
            let mut actions = Vec::new();
            if class == egui::ViewportClass::Embedded {
                egui::Window::new(title.as_str())
                    .id(egui::Id::new(viewport_id))
                    .open(&mut open)
                    .resizable(false)
                    .show(ctx, |ui| controls(ui, id, address, selected, &mut actions));
            } else {
                egui::CentralPanel::default()
                    .show(ctx, |ui| controls(ui, id, address, selected, &mut actions));
                if ctx.input(|i| i.viewport().close_requested()) {
                    open = false;
                }
            }
            toasts.show(ctx, ("scope_toasts", id));
            actions
        });

        self.open = open;
        if !self.open {
            info!(address = %self.address, "Scope control window closed");
            return Vec::new();
        }

        for plot in &mut self.plots {
            plot.show(ctx);
        }
        self.plots.retain(PlotWindow::is_open);
        actions
    }
}

fn controls(
    ui: &mut egui::Ui,
    id: u64,
    address: &str,
    selected_channel: u8,
    actions: &mut Vec<ScopeAction>,
) {
    ui.label(format!("Instrument: {}", address));
    ui.horizontal(|ui| {
        let current = selected_channel.to_string();
        egui::ComboBox::new(("channel", id), "Channel")
            .selected_text(current.as_str())
            .show_ui(ui, |ui| {
                for option in CHANNEL_SELECTOR.options {
                    if ui.selectable_label(current == *option, *option).clicked()
                        && current != *option
                    {
                        actions.push(CHANNEL_SELECTOR.on_selection_changed(option));
                    }
                }
            });

        if ui.button(DOWNLOAD_WAVEFORM.label).clicked() {
            actions.push(DOWNLOAD_WAVEFORM.on_click());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::mock::MockDirectory;
    use crate::instrument::{InstrumentSpec, InstrumentType};

    fn bench() -> MockDirectory {
        MockDirectory::new(vec![InstrumentSpec::new(
            "USB0::1",
            "Acme",
            "X1",
            InstrumentType::Oscilloscope,
        )])
        .with_samples(16)
    }

    #[test]
    fn rejects_options_outside_the_drop_down() {
        let mut window = ScopeControlWindow::new(0, "USB0::1");
        window.select_channel("3").unwrap();
        for bad in ["0", "9", "", "two", " 4"] {
            assert!(matches!(
                window.select_channel(bad),
                Err(AppError::InvalidChannel(_))
            ));
        }
        assert_eq!(window.selected_channel(), 3);
    }

    #[test]
    fn download_opens_a_plot_per_success() {
        let directory = bench();
        let mut window = ScopeControlWindow::new(0, "USB0::1");
        window.download_waveform(&directory).unwrap();
        window.download_waveform(&directory).unwrap();
        assert_eq!(window.plots().len(), 2);
        assert_eq!(window.plots()[0].waveform().len(), 16);
    }

    #[test]
    fn failure_is_reported_in_the_window() {
        let directory = bench();
        let mut window = ScopeControlWindow::new(0, "GPIB0::9::INSTR");
        window.handle(ScopeAction::DownloadWaveform, &directory);
        assert!(window.plots().is_empty());
        let toast = window.toasts().last().unwrap();
        assert!(toast.message.starts_with("Acquisition failed"));
        assert!(toast.message.contains("GPIB0::9::INSTR"));
    }
}
