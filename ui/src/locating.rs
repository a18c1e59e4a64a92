use widgetry::{
    EventCtx, GfxCtx, HorizontalAlignment, Line, Panel, State, Text, TextExt, UpdateType,
    VerticalAlignment, Widget,
};

use trip::Outcome;

use crate::title::TitleScreen;
use crate::{App, Transition};

// How many events pass between steps of the progress animation
const FRAMES_PER_STEP: usize = 20;

/// Waiting for the platform to say where the user is
pub struct Locating {
    panel: Panel,
    frames: usize,
}

impl Locating {
    pub fn new_state(ctx: &mut EventCtx) -> Box<dyn State<App>> {
        Box::new(Self {
            panel: Panel::new_builder(Widget::col(vec![
                Line("Finding you").small_heading().into_widget(ctx),
                "Hang tight while we work out where you are.".text_widget(ctx),
                progress(ctx, 0),
            ]))
            .aligned(HorizontalAlignment::Center, VerticalAlignment::Center)
            .build(ctx),
            frames: 0,
        })
    }
}

impl State<App> for Locating {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        // Keep polling, even if the user does nothing
        ctx.request_update(UpdateType::Game);

        self.frames += 1;
        if self.frames % FRAMES_PER_STEP == 0 {
            let step = self.frames / FRAMES_PER_STEP;
            self.panel.replace(ctx, "progress", progress(ctx, step));
        }

        match app.view.poll() {
            Ok(Outcome::Nothing) => Transition::Keep,
            Ok(Outcome::Showing) => {
                Transition::Replace(crate::trip_viewer::TripViewer::new_state(ctx, app))
            }
            Ok(Outcome::Failed(err)) => back_to_title(ctx, err.to_string()),
            Err(err) => {
                error!("Couldn't show the trip: {err}");
                app.view.teardown();
                back_to_title(ctx, err.to_string())
            }
        }
    }

    fn draw(&self, g: &mut GfxCtx, _: &App) {
        self.panel.draw(g);
    }
}

/// Returns to the start, telling the user what went wrong
pub fn back_to_title(ctx: &mut EventCtx, msg: String) -> Transition {
    Transition::Multi(vec![
        Transition::Replace(TitleScreen::new_state(ctx)),
        Transition::Push(widgetry::tools::PopupMsg::new_state(ctx, "Error", vec![msg])),
    ])
}

// An indeterminate indicator; there's no way to know how long the platform will take
fn progress(ctx: &mut EventCtx, step: usize) -> Widget {
    Text::from(Line(format!("Looking{}", ".".repeat(1 + step % 3))))
        .into_widget(ctx)
        .named("progress")
}
