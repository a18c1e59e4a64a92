use abstutil::prettyprint_usize;
use widgetry::{Line, Text};

use trip::Trip;

pub fn trip(trip: &Trip) -> Text {
    let mut txt = Text::from(Line("From: Your location"));
    txt.add_line(Line(format!("To: {}", trip.destination.name)));
    txt.add_line(Line(format!("{} as the crow flies", distance(trip.distance()))).secondary());
    txt
}

pub fn distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round() as usize)
    } else {
        format!("{} km", prettyprint_usize((meters / 1000.0).round() as usize))
    }
}
