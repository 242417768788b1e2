//! Tabular view of the discovered instruments.
//!
//! [`InstrumentsFrameModel`] is a read-only borrow of the application state that answers
//! row/column/cell/header queries. [`TableView`] holds the view-side state (selection,
//! layout revision). After the owner mutates the state it calls
//! [`TableView::layout_changed`], which clears the selection and makes the next frame
//! re-measure column widths.

use crate::app::App;
use crate::gui::actions::MainAction;
use crate::instrument::InstrumentSpec;
use egui_extras::{Column, TableBuilder};

/// Number of columns in the instrument table.
pub const COLUMN_COUNT: usize = 4;

/// Header text used for every column unless per-column headers are enabled.
pub const UNIFORM_HEADER: &str = "Instrument";

/// Which header labels the table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderStyle {
    /// "Instrument" above every column
    #[default]
    Uniform,
    /// "Address", "Make", "Model", "Type"
    PerColumn,
}

impl HeaderStyle {
    pub fn from_flag(per_column: bool) -> Self {
        if per_column {
            HeaderStyle::PerColumn
        } else {
            HeaderStyle::Uniform
        }
    }
}

/// Columns of the instrument table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentColumn {
    Address,
    Make,
    Model,
    InstrumentType,
}

impl InstrumentColumn {
    pub const ALL: [InstrumentColumn; COLUMN_COUNT] = [
        InstrumentColumn::Address,
        InstrumentColumn::Make,
        InstrumentColumn::Model,
        InstrumentColumn::InstrumentType,
    ];

    /// Maps a column index to its column; `None` for anything outside 0..4.
    pub fn from_index(index: isize) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn label(&self) -> &'static str {
        match self {
            InstrumentColumn::Address => "Address",
            InstrumentColumn::Make => "Make",
            InstrumentColumn::Model => "Model",
            InstrumentColumn::InstrumentType => "Type",
        }
    }

    pub fn value<'s>(&self, spec: &'s InstrumentSpec) -> &'s str {
        match self {
            InstrumentColumn::Address => &spec.address,
            InstrumentColumn::Make => &spec.make,
            InstrumentColumn::Model => &spec.model,
            InstrumentColumn::InstrumentType => spec.instrument_type.as_str(),
        }
    }
}

/// Read-only table adapter over [`App`].
#[derive(Debug, Clone, Copy)]
pub struct InstrumentsFrameModel<'a> {
    app: &'a App,
    headers: HeaderStyle,
}

impl<'a> InstrumentsFrameModel<'a> {
    pub fn new(app: &'a App, headers: HeaderStyle) -> Self {
        Self { app, headers }
    }

    pub fn row_count(&self) -> usize {
        self.app.len()
    }

    pub fn column_count(&self) -> usize {
        COLUMN_COUNT
    }

    /// Display text of one cell. Unknown columns and rows yield an empty string.
    pub fn cell(&self, row: usize, column: isize) -> String {
        match (self.app.instrument(row), InstrumentColumn::from_index(column)) {
            (Some(spec), Some(column)) => column.value(spec).to_string(),
            _ => String::new(),
        }
    }

    pub fn header(&self, column: isize) -> &'static str {
        match self.headers {
            HeaderStyle::Uniform => UNIFORM_HEADER,
            HeaderStyle::PerColumn => InstrumentColumn::from_index(column)
                .map(|c| c.label())
                .unwrap_or_default(),
        }
    }
}

/// Selection and layout state of the table widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableView {
    selected_row: Option<usize>,
    revision: u64,
}

impl TableView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.selected_row
    }

    /// Selects `row` (single selection). Rows outside `0..row_count` are ignored.
    pub fn select_row(&mut self, row: usize, row_count: usize) {
        if row < row_count {
            self.selected_row = Some(row);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_row = None;
    }

    /// Bumped by every [`TableView::layout_changed`].
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The underlying rows changed: drop the selection and re-fit columns.
    pub fn layout_changed(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        self.clear_selection();
    }
}

/// Draws the table. Clicks and double-clicks are reported as actions.
pub(crate) fn show(
    ui: &mut egui::Ui,
    model: &InstrumentsFrameModel<'_>,
    view: &TableView,
    actions: &mut Vec<MainAction>,
) {
    let row_height = ui.text_style_height(&egui::TextStyle::Body) + 6.0;

    // A new id per layout revision discards remembered widths, so `Column::auto`
    // sizes to the fresh contents.
    ui.push_id(("instrument_table", view.revision()), |ui| {
        let mut table = TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .sense(egui::Sense::click());
        for _ in 1..model.column_count() {
            table = table.column(Column::auto().at_least(60.0));
        }
        table = table.column(Column::remainder());

        table
            .header(row_height, |mut header| {
                for column in 0..model.column_count() {
                    header.col(|ui| {
                        ui.strong(model.header(column as isize));
                    });
                }
            })
            .body(|body| {
                body.rows(row_height, model.row_count(), |mut row| {
                    let index = row.index();
                    row.set_selected(view.selected_row() == Some(index));
                    for column in 0..model.column_count() {
                        row.col(|ui| {
                            ui.label(model.cell(index, column as isize));
                        });
                    }
                    let response = row.response();
                    if response.clicked() {
                        actions.push(MainAction::SelectRow(index));
                    }
                    if response.double_clicked() {
                        actions.push(MainAction::SelectRow(index));
                        actions.push(MainAction::OpenSelected);
                    }
                });
            });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::headless::Driver;
    use crate::instrument::InstrumentType;

    fn app_with(n: usize) -> App {
        let mut app = App::new();
        app.replace(
            (0..n)
                .map(|i| {
                    InstrumentSpec::new(
                        format!("USB0::{}", i),
                        "Acme",
                        format!("X{}", i),
                        InstrumentType::Oscilloscope,
                    )
                })
                .collect(),
        );
        app
    }

    #[test]
    fn column_index_mapping() {
        assert_eq!(InstrumentColumn::from_index(0), Some(InstrumentColumn::Address));
        assert_eq!(InstrumentColumn::from_index(3), Some(InstrumentColumn::InstrumentType));
        assert_eq!(InstrumentColumn::from_index(4), None);
        assert_eq!(InstrumentColumn::from_index(-1), None);
    }

    #[test]
    fn out_of_range_row_is_empty() {
        let app = app_with(2);
        let model = InstrumentsFrameModel::new(&app, HeaderStyle::Uniform);
        assert_eq!(model.cell(1, 2), "X1");
        assert_eq!(model.cell(2, 0), "");
    }

    #[test]
    fn headers_follow_style() {
        let app = app_with(0);
        let uniform = InstrumentsFrameModel::new(&app, HeaderStyle::Uniform);
        let per_column = InstrumentsFrameModel::new(&app, HeaderStyle::PerColumn);
        for column in 0..4 {
            assert_eq!(uniform.header(column), "Instrument");
        }
        assert_eq!(per_column.header(0), "Address");
        assert_eq!(per_column.header(3), "Type");
        assert_eq!(per_column.header(7), "");
    }

    #[test]
    fn layout_change_clears_selection() {
        let mut view = TableView::new();
        view.select_row(1, 3);
        assert_eq!(view.selected_row(), Some(1));
        view.select_row(5, 3);
        assert_eq!(view.selected_row(), Some(1));
        view.layout_changed();
        assert_eq!(view.selected_row(), None);
        assert_eq!(view.revision(), 1);
    }

    /// Actions the table raises for `clicks` quick clicks at `pos` on a fresh context.
    fn actions_after(app: &App, view: &TableView, pos: egui::Pos2, clicks: usize) -> Vec<MainAction> {
        let model = InstrumentsFrameModel::new(app, HeaderStyle::Uniform);
        let mut actions = Vec::new();
        let mut draw = |ctx: &egui::Context| {
            egui::CentralPanel::default().show(ctx, |ui| show(ui, &model, view, &mut actions));
        };
        let mut driver = Driver::new();
        driver.settle(&mut draw);
        driver.click(pos, clicks, &mut draw);
        actions
    }

    /// Height at which a single click first selects `row`.
    fn row_y(app: &App, row: usize) -> Option<f32> {
        let view = TableView::new();
        (0..80).map(|i| 10.0 + i as f32 * 3.0).find(|&y| {
            actions_after(app, &view, egui::pos2(30.0, y), 1) == vec![MainAction::SelectRow(row)]
        })
    }

    #[test]
    fn click_selects_and_double_click_opens() {
        let app = app_with(3);
        let first = row_y(&app, 0).expect("row 0 never selected");
        let second = row_y(&app, 1).expect("row 1 never selected");
        assert!(first < second);

        let actions = actions_after(&app, &TableView::new(), egui::pos2(30.0, second), 2);
        assert_eq!(actions.last(), Some(&MainAction::OpenSelected));
        assert_eq!(
            actions[actions.len() - 2],
            MainAction::SelectRow(1),
            "double-click must select the row before opening it: {:?}",
            actions
        );
        assert!(actions.iter().all(|a| matches!(a, MainAction::SelectRow(1) | MainAction::OpenSelected)));
    }
}
