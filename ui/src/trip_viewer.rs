use widgetry::{
    EventCtx, GfxCtx, HorizontalAlignment, Line, Outcome, Panel, State, Text, UpdateType,
    VerticalAlignment, Widget,
};

use crate::components::describe;
use crate::locating::back_to_title;
use crate::title::TitleScreen;
use crate::{App, Present, Transition};

/// The map with the trip on it, and a little overlay describing it
pub struct TripViewer {
    panel: Panel,
}

impl TripViewer {
    pub fn new_state(ctx: &mut EventCtx, app: &App) -> Box<dyn State<App>> {
        let description = match app.view.trip() {
            Some(trip) => describe::trip(trip),
            None => Text::new(),
        };
        // The map may have just been replaced; don't wait for input to draw it
        ctx.request_update(UpdateType::Game);
        Box::new(Self {
            panel: Panel::new_builder(Widget::col(vec![
                Line("Your Adventure Awaits!")
                    .small_heading()
                    .into_widget(ctx),
                description.into_widget(ctx),
                Widget::row(vec![
                    ctx.style().btn_outline.text("Somewhere else").build_def(ctx),
                    ctx.style().btn_outline.text("Start over").build_def(ctx),
                ]),
            ]))
            .aligned(HorizontalAlignment::Left, VerticalAlignment::Top)
            .build(ctx),
        })
    }
}

impl State<App> for TripViewer {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        ctx.canvas_movement();

        if let Err(err) = app.view.poll() {
            error!("Couldn't draw the trip: {err}");
            app.view.teardown();
            return back_to_title(ctx, err.to_string());
        }
        if let Some(map) = app.view.map_mut() {
            map.event(ctx);
        }
        // MapLibre loads its style asynchronously, so keep polling until the trip is on the map
        let map_dirty = app.view.map().map(|map| map.is_dirty()).unwrap_or(false);
        if !app.view.is_drawn() || map_dirty {
            ctx.request_update(UpdateType::Game);
        }

        if let Outcome::Clicked(x) = self.panel.event(ctx) {
            match x.as_ref() {
                "Somewhere else" => {
                    return match app.view.change_destination() {
                        Ok(()) => Transition::Replace(Self::new_state(ctx, app)),
                        Err(err) => {
                            app.view.teardown();
                            back_to_title(ctx, err.to_string())
                        }
                    };
                }
                "Start over" => {
                    app.view.teardown();
                    return Transition::Replace(TitleScreen::new_state(ctx));
                }
                _ => unreachable!(),
            }
        }

        Transition::Keep
    }

    fn draw(&self, g: &mut GfxCtx, app: &App) {
        if let Some(map) = app.view.map() {
            map.draw(g);
        }
        self.panel.draw(g);
    }
}
