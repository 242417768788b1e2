//! The eframe/egui implementation for the GUI.
pub mod actions;
#[cfg(test)]
mod headless;
pub mod instrument_table;
pub mod main_window;
pub mod plot_window;
pub mod scope_window;
pub mod toast;

use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::instrument::InstrumentDirectory;
use eframe::egui;
use tracing::info;

use self::actions::{OnClick, LIST_INSTRUMENTS, QUIT};
use self::instrument_table::HeaderStyle;
use self::main_window::MainWindow;

/// The eframe application: main window plus the scope windows it spawned.
pub struct MiniScopeApp {
    window: MainWindow,
}

impl MiniScopeApp {
    pub fn new(directory: Box<dyn InstrumentDirectory>, settings: &Settings) -> Self {
        let headers = HeaderStyle::from_flag(settings.table.per_column_headers);
        Self {
            window: MainWindow::new(directory, headers),
        }
    }

    fn ui(&mut self, ctx: &egui::Context) {
        let mut actions = Vec::new();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button(LIST_INSTRUMENTS.label).clicked() {
                    actions.push(LIST_INSTRUMENTS.on_click());
                }
                ui.separator();
                ui.label(format!("{} instrument(s)", self.window.app().len()));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(QUIT.label).clicked() {
                        actions.push(QUIT.on_click());
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let (model, view) = self.window.table_parts();
            instrument_table::show(ui, &model, view, &mut actions);
        });

        for action in actions {
            self.window.handle(action);
        }

        if self.window.quit_requested() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        self.window.show_scope_windows(ctx);
        self.window.toasts_mut().show(ctx, "main_toasts");
    }
}

impl eframe::App for MiniScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui(ctx);
    }
}

/// Opens the main window and runs the event loop until it is closed.
pub fn run(settings: &Settings, directory: Box<dyn InstrumentDirectory>) -> AppResult<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(settings.application.name.clone())
            .with_inner_size([settings.window.width, settings.window.height]),
        ..Default::default()
    };

    info!(backend = directory.name(), "Starting GUI");
    let app = MiniScopeApp::new(directory, settings);
    eframe::run_native(
        &settings.application.name,
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| AppError::Gui(e.to_string()))?;

    info!("GUI closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::headless::{requested_close, Driver};
    use super::*;
    use crate::instrument::mock::MockDirectory;

    fn app() -> MiniScopeApp {
        let settings = Settings::default();
        let directory = MockDirectory::from_settings(&settings.directory).unwrap();
        MiniScopeApp::new(Box::new(directory), &settings)
    }

    /// Pointer positions across the toolbar, right edge first.
    fn toolbar_right() -> impl Iterator<Item = egui::Pos2> {
        (0..20).flat_map(|x| {
            (0..7).map(move |y| egui::pos2(796.0 - x as f32 * 5.0, 4.0 + y as f32 * 4.0))
        })
    }

    #[test]
    fn quit_button_closes_the_root_viewport() {
        let mut app = app();
        let mut driver = Driver::new();
        let mut draw = |ctx: &egui::Context| app.ui(ctx);
        assert!(!requested_close(&driver.settle(&mut draw)));

        let mut closed = false;
        for pos in toolbar_right() {
            if requested_close(&driver.click(pos, 1, &mut draw)) {
                closed = true;
                break;
            }
        }
        assert!(closed, "no toolbar position hit the Quit button");
        assert!(app.window.quit_requested());
    }

    #[test]
    fn list_button_fills_the_table() {
        let mut app = app();
        let mut driver = Driver::new();
        driver.settle(&mut |ctx: &egui::Context| app.ui(ctx));

        for x in 0..20 {
            let pos = egui::pos2(12.0 + x as f32 * 4.0, 14.0);
            driver.click(pos, 1, &mut |ctx: &egui::Context| app.ui(ctx));
            if !app.window.app().is_empty() {
                break;
            }
        }
        assert!(!app.window.app().is_empty());
        assert!(!app.window.quit_requested());
    }
}
