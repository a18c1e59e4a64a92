pub mod test_utils;

use rand::rngs::StdRng;
use rand::SeedableRng;

use test_utils::{catalog, Call, RecordingWidget};
use trip::geolocation::{self, FixedLocation, LocateFailure};
use trip::map::MarkerStyle;
use trip::{Coordinate, LocateError, MapConfig, Outcome, Phase, TripView, ROUTE_LAYER};

const SYDNEY: (f64, f64) = (151.2, -33.9);

fn sydney() -> FixedLocation {
    FixedLocation(Some(Coordinate::new(SYDNEY.0, SYDNEY.1)))
}

fn view(widget: &RecordingWidget, cities: &[(&str, f64, f64)]) -> TripView<RecordingWidget> {
    TripView::new(catalog(cities), MapConfig::new("test-key"), widget.clone())
        .with_rng(StdRng::seed_from_u64(7))
}

#[test]
fn take_me_to_perth() {
    let widget = RecordingWidget::new();
    let mut view = view(&widget, &[("Perth", 115.8, -31.9)]);
    assert_eq!(view.phase(), Phase::Idle);

    view.request_trip(&sydney()).unwrap();
    assert_eq!(view.phase(), Phase::Locating);

    assert_eq!(view.poll().unwrap(), Outcome::Showing);
    assert_eq!(view.phase(), Phase::Showing);

    let trip = view.trip().unwrap();
    assert_eq!(trip.destination.name, "Perth");
    assert_eq!(trip.origin, Coordinate::new(151.2, -33.9));
    assert_eq!(trip.center(), Coordinate::new(133.5, -32.9));

    let origin = Coordinate::new(151.2, -33.9);
    let perth = Coordinate::new(115.8, -31.9);
    let calls = widget.calls();
    assert_eq!(calls.len(), 5);
    match &calls[0] {
        Call::Construct(options) => {
            assert_eq!(options.center, Coordinate::new(133.5, -32.9));
            assert_eq!(options.zoom, 3.0);
            assert_eq!(options.container, "map");
            assert_eq!(
                options.style_url,
                "https://api.maptiler.com/maps/streets/style.json?key=test-key"
            );
        }
        x => panic!("Expected the map to be constructed first, got {:?}", x),
    }
    assert_eq!(
        calls[1],
        Call::AddRoute {
            map: 1,
            id: ROUTE_LAYER.to_string(),
            line: vec![vec![151.2, -33.9], vec![115.8, -31.9]],
            style: MapConfig::new("test-key").route,
        }
    );
    assert_eq!(
        calls[2],
        Call::AddMarker {
            map: 1,
            pt: origin,
            style: MarkerStyle::default(),
        }
    );
    assert_eq!(
        calls[3],
        Call::AddMarker {
            map: 1,
            pt: perth,
            style: MarkerStyle {
                color: Some("#FF0000".to_string()),
            },
        }
    );
    match &calls[4] {
        Call::FitBounds {
            bounds, options, ..
        } => {
            assert!(bounds.contains(origin));
            assert!(bounds.contains(perth));
            assert_eq!(options.padding, 50.0);
            assert!(options.max_zoom <= 15.0);
        }
        x => panic!("Expected a fit, got {:?}", x),
    }

    // Nothing gets drawn twice
    assert_eq!(view.poll().unwrap(), Outcome::Nothing);
    assert_eq!(widget.calls().len(), 5);
}

#[test]
fn no_geolocation_at_all() {
    let widget = RecordingWidget::new();
    let mut view = view(&widget, &[("Perth", 115.8, -31.9)]);

    assert_eq!(
        view.request_trip(&FixedLocation(None)),
        Err(LocateError::CapabilityUnavailable)
    );
    assert_eq!(view.phase(), Phase::Idle);
    assert_eq!(view.poll().unwrap(), Outcome::Nothing);
    assert_eq!(view.phase(), Phase::Idle);
    assert_eq!(widget.constructed(), 0);
    assert!(view.map().is_none());
}

struct Deferred(std::cell::RefCell<Option<geolocation::LocationResolver>>);

impl trip::Geolocator for Deferred {
    fn request_location(&self) -> Result<trip::PendingLocation, LocateError> {
        let (resolver, pending) = geolocation::channel();
        *self.0.borrow_mut() = Some(resolver);
        Ok(pending)
    }
}

#[test]
fn location_denied_goes_back_to_idle() {
    let widget = RecordingWidget::new();
    let mut view = view(&widget, &[("Perth", 115.8, -31.9)]);
    let platform = Deferred(std::cell::RefCell::new(None));

    view.request_trip(&platform).unwrap();
    assert_eq!(view.poll().unwrap(), Outcome::Nothing);
    assert_eq!(view.phase(), Phase::Locating);

    let resolver = platform.0.borrow_mut().take().unwrap();
    resolver.resolve(Err(LocateError::LocationUnavailable(
        LocateFailure::PermissionDenied,
    )));
    assert_eq!(
        view.poll().unwrap(),
        Outcome::Failed(LocateError::LocationUnavailable(
            LocateFailure::PermissionDenied
        ))
    );
    assert_eq!(view.phase(), Phase::Idle);
    assert_eq!(widget.constructed(), 0);

    // The user can try again
    view.request_trip(&sydney()).unwrap();
    assert_eq!(view.poll().unwrap(), Outcome::Showing);
}

#[test]
fn one_request_at_a_time() {
    let widget = RecordingWidget::new();
    let mut view = view(&widget, &[("Perth", 115.8, -31.9)]);
    let platform = Deferred(std::cell::RefCell::new(None));

    view.request_trip(&platform).unwrap();
    let first = platform.0.borrow_mut().take().unwrap();
    // Clicking again while waiting doesn't start a second request
    view.request_trip(&platform).unwrap();
    assert!(platform.0.borrow().is_none());
    assert_eq!(view.phase(), Phase::Locating);

    first.resolve(Ok(Coordinate::new(SYDNEY.0, SYDNEY.1)));
    assert_eq!(view.poll().unwrap(), Outcome::Showing);

    // Or while showing
    view.request_trip(&sydney()).unwrap();
    assert_eq!(view.phase(), Phase::Showing);
    assert_eq!(widget.constructed(), 1);
}

#[test]
fn draws_once_the_map_is_ready() {
    let widget = RecordingWidget::loading_slowly();
    let mut view = view(&widget, &[("Darwin", 130.8411, -12.4381)]);

    view.request_trip(&sydney()).unwrap();
    assert_eq!(view.poll().unwrap(), Outcome::Showing);
    assert_eq!(widget.calls().len(), 1);
    assert!(!view.is_drawn());
    assert_eq!(view.poll().unwrap(), Outcome::Nothing);
    assert_eq!(widget.calls().len(), 1);
    assert!(!view.is_drawn());

    widget.loaded.set(true);
    assert_eq!(view.poll().unwrap(), Outcome::Nothing);
    assert_eq!(widget.calls().len(), 5);
    assert!(view.is_drawn());
    assert_eq!(view.poll().unwrap(), Outcome::Nothing);
    assert_eq!(widget.calls().len(), 5);
}

#[test]
fn fit_is_capped_for_close_trips() {
    let widget = RecordingWidget::new();
    let here = Coordinate::new(147.3250, -42.8806);
    let mut view = view(&widget, &[("Hobart", 147.3250, -42.8806)]);

    view.request_trip(&FixedLocation(Some(here))).unwrap();
    view.poll().unwrap();
    let fit = widget
        .calls()
        .into_iter()
        .find_map(|call| match call {
            Call::FitBounds {
                bounds, options, ..
            } => Some((bounds, options)),
            _ => None,
        })
        .unwrap();
    assert!(fit.0.contains(here));
    assert_eq!(fit.1.max_zoom, 15.0);
    assert_eq!(fit.0.fit_zoom(800.0, 600.0, &fit.1), 15.0);
}

#[test]
fn changing_destination_replaces_the_map() {
    let widget = RecordingWidget::new();
    let mut view = view(
        &widget,
        &[
            ("Perth", 115.8, -31.9),
            ("Darwin", 130.8, -12.4),
            ("Hobart", 147.3, -42.9),
        ],
    );
    view.request_trip(&sydney()).unwrap();
    view.poll().unwrap();

    for _ in 0..5 {
        view.change_destination().unwrap();
        assert_eq!(view.trip().unwrap().origin, Coordinate::new(151.2, -33.9));
        assert_eq!(widget.live(), 1);
        // A map that's ready right away is drawn without another poll
        assert!(view.is_drawn());
    }
    assert_eq!(widget.constructed(), 6);
    assert_eq!(widget.max_live(), 1);

    // Every map is removed before the next is constructed
    let calls = widget.calls();
    let mut live = 0;
    for call in &calls {
        match call {
            Call::Construct(_) => {
                assert_eq!(live, 0);
                live += 1;
            }
            Call::Remove(_) => {
                live -= 1;
            }
            _ => {}
        }
    }
}

#[test]
fn teardown_and_drop_release_the_map() {
    let widget = RecordingWidget::new();
    let mut view = view(&widget, &[("Perth", 115.8, -31.9)]);
    view.request_trip(&sydney()).unwrap();
    view.poll().unwrap();
    assert_eq!(widget.live(), 1);

    view.teardown();
    assert_eq!(widget.live(), 0);
    assert_eq!(view.phase(), Phase::Idle);
    assert!(!view.is_drawn());
    assert!(view.trip().is_none());
    assert!(view.change_destination().is_err());

    view.request_trip(&sydney()).unwrap();
    view.poll().unwrap();
    assert_eq!(widget.live(), 1);
    drop(view);
    assert_eq!(widget.live(), 0);
    assert_eq!(widget.max_live(), 1);
    assert_eq!(widget.calls().last(), Some(&Call::Remove(2)));
}

#[test]
fn broken_widget_stays_idle() {
    let mut widget = RecordingWidget::new();
    widget.broken = true;
    let mut view = view(&widget, &[("Perth", 115.8, -31.9)]);
    view.request_trip(&sydney()).unwrap();
    assert!(view.poll().is_err());
    assert_eq!(view.phase(), Phase::Idle);
    assert_eq!(widget.live(), 0);
}

#[test]
fn awaiting_the_location() {
    let widget = RecordingWidget::new();
    let mut view = view(&widget, &[("Perth", 115.8, -31.9)]);
    let platform = Deferred(std::cell::RefCell::new(None));
    view.request_trip(&platform).unwrap();
    platform
        .0
        .borrow_mut()
        .take()
        .unwrap()
        .resolve(Ok(Coordinate::new(SYDNEY.0, SYDNEY.1)));

    assert_eq!(
        pollster::block_on(view.finish_locating()).unwrap(),
        Outcome::Showing
    );
    assert_eq!(view.trip().unwrap().destination.name, "Perth");
}

#[test]
fn stray_locations_are_ignored() {
    let widget = RecordingWidget::new();
    let mut view = view(&widget, &[("Perth", 115.8, -31.9)]);
    assert_eq!(
        view.resolve(Ok(Coordinate::new(0.0, 0.0))).unwrap(),
        Outcome::Nothing
    );
    assert_eq!(view.phase(), Phase::Idle);
    assert_eq!(widget.constructed(), 0);
}

#[test]
fn bundled_catalog_end_to_end() {
    let widget = RecordingWidget::new();
    let mut view = TripView::new(
        trip::Catalog::australia().unwrap(),
        MapConfig::from_key(Some("key".to_string())).unwrap(),
        widget.clone(),
    );
    view.request_trip(&sydney()).unwrap();
    assert_eq!(view.poll().unwrap(), Outcome::Showing);

    let trip = view.trip().unwrap().clone();
    assert!(view.catalog().contains(&trip.destination));
    match &widget.calls()[0] {
        Call::Construct(options) => assert_eq!(options.center, trip.center()),
        x => panic!("Expected the map to be constructed first, got {:?}", x),
    }
}
