//! Runs egui frames against a bare `Context` so UI wiring can be tested without a window.

use eframe::egui;

const SCREEN: egui::Vec2 = egui::vec2(800.0, 600.0);
const FRAME_DT: f64 = 0.05;

pub(crate) struct Driver {
    ctx: egui::Context,
    time: f64,
}

impl Driver {
    pub(crate) fn new() -> Self {
        Self {
            ctx: egui::Context::default(),
            time: 0.0,
        }
    }

    /// Runs one frame with the given input events.
    pub(crate) fn frame(
        &mut self,
        events: Vec<egui::Event>,
        run_ui: &mut dyn FnMut(&egui::Context),
    ) -> egui::FullOutput {
        self.time += FRAME_DT;
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(egui::Pos2::ZERO, SCREEN)),
            time: Some(self.time),
            events,
            ..Default::default()
        };
        self.ctx.run(input, |ctx| run_ui(ctx))
    }

    /// A few empty frames so auto-sized layouts reach their final size.
    pub(crate) fn settle(&mut self, run_ui: &mut dyn FnMut(&egui::Context)) -> Vec<egui::FullOutput> {
        (0..3).map(|_| self.frame(Vec::new(), run_ui)).collect()
    }

    /// Moves the pointer to `pos` and clicks `count` times in quick succession.
    pub(crate) fn click(
        &mut self,
        pos: egui::Pos2,
        count: usize,
        run_ui: &mut dyn FnMut(&egui::Context),
    ) -> Vec<egui::FullOutput> {
        let mut outputs = vec![self.frame(vec![egui::Event::PointerMoved(pos)], run_ui)];
        for _ in 0..count {
            for pressed in [true, false] {
                let event = egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    modifiers: egui::Modifiers::NONE,
                };
                outputs.push(self.frame(vec![event], run_ui));
            }
        }
        outputs
    }
}

/// Whether any frame asked the root viewport to close.
pub(crate) fn requested_close(outputs: &[egui::FullOutput]) -> bool {
    outputs.iter().any(|output| {
        output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .is_some_and(|viewport| {
                viewport
                    .commands
                    .iter()
                    .any(|command| matches!(command, egui::ViewportCommand::Close))
            })
    })
}
