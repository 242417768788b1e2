//! Main window state: the instrument list and the scope windows opened from it.

use crate::app::App;
use crate::error::{AppError, AppResult};
use crate::gui::actions::{MainAction, ScopeAction};
use crate::gui::instrument_table::{HeaderStyle, InstrumentsFrameModel, TableView};
use crate::gui::scope_window::ScopeControlWindow;
use crate::gui::toast::Toasts;
use crate::instrument::InstrumentDirectory;
use eframe::egui;
use tracing::{error, info, warn};

/// State behind the main window: the scanned instruments, the table selection and
/// every scope control window opened from it.
pub struct MainWindow {
    app: App,
    directory: Box<dyn InstrumentDirectory>,
    table: TableView,
    headers: HeaderStyle,
    scope_windows: Vec<ScopeControlWindow>,
    next_window_id: u64,
    toasts: Toasts,
    quit_requested: bool,
}

impl MainWindow {
    pub fn new(directory: Box<dyn InstrumentDirectory>, headers: HeaderStyle) -> Self {
        Self {
            app: App::new(),
            directory,
            table: TableView::new(),
            headers,
            scope_windows: Vec::new(),
            next_window_id: 0,
            toasts: Toasts::new(),
            quit_requested: false,
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn model(&self) -> InstrumentsFrameModel<'_> {
        InstrumentsFrameModel::new(&self.app, self.headers)
    }

    pub fn table(&self) -> &TableView {
        &self.table
    }

    pub fn scope_windows(&self) -> &[ScopeControlWindow] {
        &self.scope_windows
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Rescans the bus and replaces the table contents.
    ///
    /// The previous list is discarded before the scan, so a failed scan leaves the table
    /// empty. An empty result is refreshed into the table and then reported.
    pub fn list_instruments(&mut self) -> AppResult<()> {
        self.app.clear();
        self.table.layout_changed();

        info!(backend = self.directory.name(), "Scanning for connected instruments");
        let instruments = self
            .directory
            .list_instruments()
            .map_err(AppError::discovery)?;

        info!(count = instruments.len(), "Scan complete");
        self.app.replace(instruments);
        self.table.layout_changed();

        if self.app.is_empty() {
            return Err(AppError::Discovery("no instruments found".to_string()));
        }
        Ok(())
    }

    pub fn select_row(&mut self, row: usize) {
        self.table.select_row(row, self.app.len());
    }

    /// Opens a scope control window for the selected row and returns its id.
    pub fn open_selected(&mut self) -> AppResult<u64> {
        let address = self
            .table
            .selected_row()
            .and_then(|row| self.app.instrument(row))
            .map(|spec| spec.address.clone())
            .ok_or(AppError::NoSelection)?;

        let id = self.next_window_id;
        self.next_window_id += 1;
        self.scope_windows.push(ScopeControlWindow::new(id, address));
        Ok(id)
    }

    pub fn dispatch(&mut self, action: MainAction) -> AppResult<()> {
        match action {
            MainAction::ListInstruments => self.list_instruments(),
            MainAction::SelectRow(row) => {
                self.select_row(row);
                Ok(())
            }
            MainAction::OpenSelected => self.open_selected().map(|_| ()),
            MainAction::Quit => {
                info!("Quit requested");
                self.quit_requested = true;
                Ok(())
            }
        }
    }

    /// Runs `action`, turning any failure into a notification.
    pub fn handle(&mut self, action: MainAction) {
        if let Err(e) = self.dispatch(action) {
            if e.is_recoverable() {
                warn!(error = %e, "Main window action failed");
            } else {
                error!(error = %e, "Main window action failed");
            }
            self.toasts.report(&e);
        }
    }

    /// Runs a scope action in the scope window with the given id.
    pub fn dispatch_scope(&mut self, id: u64, action: ScopeAction) -> AppResult<()> {
        let directory = self.directory.as_ref();
        let window = self
            .scope_windows
            .iter_mut()
            .find(|w| w.id() == id)
            .ok_or_else(|| AppError::Gui(format!("No scope window with id {}", id)))?;
        window.dispatch(action, directory)
    }

    /// Routes a scope action to the scope window with the given id.
    ///
    /// Failures are reported in that window; an unknown id is reported here.
    pub fn handle_scope(&mut self, id: u64, action: ScopeAction) {
        let directory = self.directory.as_ref();
        match self.scope_windows.iter_mut().find(|w| w.id() == id) {
            Some(window) => window.handle(action, directory),
            None => {
                let e = AppError::Gui(format!("No scope window with id {}", id));
                warn!(error = %e, "Scope action dropped");
                self.toasts.report(&e);
            }
        }
    }

    /// Draws every open scope window, runs what they raised and forgets the closed ones.
    pub fn show_scope_windows(&mut self, ctx: &egui::Context) {
        let mut raised = Vec::new();
        for window in &mut self.scope_windows {
            let id = window.id();
            raised.extend(window.show(ctx).into_iter().map(|action| (id, action)));
        }

        if !raised.is_empty() {
            for (id, action) in raised {
                self.handle_scope(id, action);
            }
            ctx.request_repaint();
        }
        self.scope_windows.retain(ScopeControlWindow::is_open);
    }

    pub(crate) fn table_parts(&self) -> (InstrumentsFrameModel<'_>, &TableView) {
        (self.model(), &self.table)
    }

    pub(crate) fn toasts_mut(&mut self) -> &mut Toasts {
        &mut self.toasts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::mock::MockDirectory;
    use crate::instrument::{InstrumentSpec, InstrumentType};
    use tracing_test::traced_test;

    fn window() -> MainWindow {
        MainWindow::new(
            Box::new(MockDirectory::new(vec![InstrumentSpec::new(
                "USB0::1",
                "Acme",
                "X1",
                InstrumentType::Oscilloscope,
            )])),
            HeaderStyle::Uniform,
        )
    }

    #[traced_test]
    #[test]
    fn scan_is_logged() {
        let mut window = window();
        window.dispatch(MainAction::ListInstruments).unwrap();
        assert!(logs_contain("Scanning for connected instruments"));
        assert!(logs_contain("Scan complete"));
    }

    #[traced_test]
    #[test]
    fn failures_are_logged_and_shown() {
        let mut window = window();
        window.handle(MainAction::OpenSelected);
        assert!(logs_contain("Main window action failed"));
        assert_eq!(window.toasts().len(), 1);
    }

    #[test]
    fn scope_failures_land_in_the_scope_window() {
        let mut window = window();
        window.list_instruments().unwrap();
        window.select_row(0);
        let id = window.open_selected().unwrap();
        window.handle_scope(id, ScopeAction::SelectChannel("9".into()));
        assert_eq!(window.scope_windows()[0].toasts().len(), 1);
        assert!(window.toasts().is_empty());

        window.handle_scope(id + 1, ScopeAction::DownloadWaveform);
        assert_eq!(window.toasts().len(), 1);
    }

    #[test]
    fn unknown_scope_window_id() {
        let mut window = window();
        assert!(matches!(
            window.dispatch_scope(7, ScopeAction::DownloadWaveform),
            Err(AppError::Gui(_))
        ));
    }
}
