//! User actions and the controls that produce them.
//!
//! Rendering code never mutates window state. Each control turns user input into an
//! action value through [`OnClick`] or [`OnSelectionChanged`]; the owning window then
//! runs it through `dispatch`. Tests drive the same `dispatch` entry points without
//! a graphics context.

/// Actions raised by the main window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainAction {
    /// Rescan the bus and replace the instrument list
    ListInstruments,
    /// Single-row selection in the instrument table
    SelectRow(usize),
    /// Open a scope control window for the selected row (row double-click)
    OpenSelected,
    /// Close the main window
    Quit,
}

/// Actions raised by a scope control window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeAction {
    /// The channel drop-down changed to the given option text
    SelectChannel(String),
    /// Download the selected channel's waveform and plot it
    DownloadWaveform,
}

/// A control that raises an action when clicked.
pub trait OnClick {
    type Action;

    fn on_click(&self) -> Self::Action;
}

/// A control that raises an action when its selected option changes.
pub trait OnSelectionChanged {
    type Action;

    fn on_selection_changed(&self, selected: &str) -> Self::Action;
}

/// Push button bound to a fixed action.
#[derive(Debug, Clone)]
pub struct Button<A> {
    pub label: &'static str,
    action: A,
}

impl<A> Button<A> {
    pub const fn new(label: &'static str, action: A) -> Self {
        Self { label, action }
    }
}

impl<A: Clone> OnClick for Button<A> {
    type Action = A;

    fn on_click(&self) -> A {
        self.action.clone()
    }
}

/// Drop-down listing the channel numbers of a scope.
#[derive(Debug, Clone, Copy)]
pub struct ChannelSelector {
    pub options: &'static [&'static str],
}

impl OnSelectionChanged for ChannelSelector {
    type Action = ScopeAction;

    fn on_selection_changed(&self, selected: &str) -> ScopeAction {
        ScopeAction::SelectChannel(selected.to_string())
    }
}

/// Choices offered by the channel drop-down.
pub const CHANNEL_OPTIONS: [&str; 8] = ["1", "2", "3", "4", "5", "6", "7", "8"];

pub const LIST_INSTRUMENTS: Button<MainAction> =
    Button::new("List Instruments", MainAction::ListInstruments);
pub const QUIT: Button<MainAction> = Button::new("Quit", MainAction::Quit);
pub const DOWNLOAD_WAVEFORM: Button<ScopeAction> =
    Button::new("Download waveform", ScopeAction::DownloadWaveform);
pub const CHANNEL_SELECTOR: ChannelSelector = ChannelSelector {
    options: &CHANNEL_OPTIONS,
};
