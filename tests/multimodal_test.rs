mod utils;

use utils::{departure, departure_on, init, single_line, transfer_town, transit_town};
use wayfarer::engine::WALK_SPEED;
use wayfarer::geometry::{self, LonLat};
use wayfarer::response::{ManeuverType, Mode};
use wayfarer::{plan, PlannerConfig, PlanRequest};

#[test]
fn boarding_records_the_wait_and_the_ride_window() {
    init();
    let store = single_line();

    // leave early enough to stand at the stop exactly 60 seconds before the
    // 600 departure of the only trip
    let walk = (geometry::distance(&LonLat::new(0.0, 0.0), &LonLat::new(0.001, 0.0)) / WALK_SPEED)
        .round() as u32;
    let request = PlanRequest {
        from: LonLat::new(0.0, 0.0),
        to: LonLat::new(0.003, 0.0),
        departure: departure(540 - walk),
    };
    let directions = plan(&store, &request, &PlannerConfig::default())
        .unwrap()
        .expect("the line bridges the two clusters");

    // even a single-hop ride must board and exit the vehicle
    let kinds: Vec<ManeuverType> = directions
        .steps
        .iter()
        .map(|step| step.maneuver.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ManeuverType::Depart,
            ManeuverType::Turn,
            ManeuverType::Notification,
            ManeuverType::ExitVehicle,
            ManeuverType::Arrive
        ]
    );

    let boarding = &directions.steps[2];
    assert_eq!(boarding.mode, Mode::Transit);
    assert_eq!(boarding.wait, Some(60));
    assert_eq!(boarding.name.as_deref(), Some("Abbey"));
    assert_eq!(
        boarding.trip.as_ref().map(|trip| trip.id.as_str()),
        Some("t1")
    );

    let alighting = &directions.steps[3];
    assert_eq!(alighting.mode, Mode::Transit);
    assert_eq!(alighting.wait, None);
    assert_eq!(alighting.name.as_deref(), Some("Beacon"));
    assert_eq!(
        alighting.trip.as_ref().map(|trip| trip.id.as_str()),
        Some("t1")
    );
    // on board at 600, alighting at 780
    assert_eq!(alighting.arrive - boarding.arrive, 240);

    assert_eq!(directions.steps[1].name.as_deref(), Some("Station Road"));
    assert_eq!(directions.steps[1].mode, Mode::Walking);

    assert_eq!(
        directions.waypoints[0].name.as_deref(),
        Some("Station Road")
    );
    assert_eq!(directions.waypoints[1].name.as_deref(), Some("Harbor Road"));

    let first_arrive = directions.steps.first().unwrap().arrive;
    let last_arrive = directions.steps.last().unwrap().arrive;
    assert_eq!(directions.duration, (last_arrive - first_arrive) as u64);
}

#[test]
fn response_serializes_to_the_directions_shape() {
    init();
    let store = single_line();

    let walk = (geometry::distance(&LonLat::new(0.0, 0.0), &LonLat::new(0.001, 0.0)) / WALK_SPEED)
        .round() as u32;
    let request = PlanRequest {
        from: LonLat::new(0.0, 0.0),
        to: LonLat::new(0.003, 0.0),
        departure: departure(540 - walk),
    };
    let directions = plan(&store, &request, &PlannerConfig::default())
        .unwrap()
        .unwrap();

    let json = serde_json::to_value(&directions).unwrap();
    assert!(json["uuid"].is_string());
    assert_eq!(json["waypoints"].as_array().unwrap().len(), 2);
    let step = &json["steps"][2];
    assert_eq!(step["mode"], "transit");
    assert_eq!(step["maneuver"]["type"], "notification");
    assert_eq!(step["geometry"]["type"], "LineString");
    assert!(step["geometry"]["coordinates"].as_array().unwrap().len() >= 2);
    assert_eq!(step["trip"]["id"], "t1");
    // absent optionals stay absent rather than null
    assert!(json["steps"][0].get("wait").is_none());
}

#[test]
fn full_multimodal_maneuver_sequence() {
    init();
    let store = transit_town();

    let departure_instant = departure(0);
    let request = PlanRequest {
        from: LonLat::new(0.0, 0.0),
        to: LonLat::new(0.014, 0.0),
        departure: departure_instant,
    };
    let directions = plan(&store, &request, &PlannerConfig::default())
        .unwrap()
        .expect("line 9 bridges the two clusters");

    let kinds: Vec<ManeuverType> = directions
        .steps
        .iter()
        .map(|step| step.maneuver.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ManeuverType::Depart,
            ManeuverType::Turn,
            ManeuverType::Turn,
            ManeuverType::Notification,
            ManeuverType::Continue,
            ManeuverType::Continue,
            ManeuverType::ExitVehicle,
            ManeuverType::Arrive
        ]
    );

    let modes: Vec<Mode> = directions.steps.iter().map(|step| step.mode).collect();
    assert_eq!(
        modes,
        vec![
            Mode::Walking,
            Mode::Walking,
            Mode::Walking,
            Mode::Transit,
            Mode::Transit,
            Mode::Transit,
            Mode::Transit,
            Mode::Walking
        ]
    );

    for step in &directions.steps {
        match step.mode {
            Mode::Transit => {
                assert_eq!(
                    step.trip.as_ref().map(|trip| trip.id.as_str()),
                    Some("line9")
                );
            }
            Mode::Walking => assert!(step.trip.is_none()),
        }
    }
    assert!(directions.steps[3].wait.is_some());
    assert_eq!(directions.steps[3].name.as_deref(), Some("Arsenal"));
    assert_eq!(directions.steps[4].name.as_deref(), Some("Bakery"));
    assert_eq!(directions.steps[5].name.as_deref(), Some("Cathedral"));
    assert_eq!(directions.steps[6].name.as_deref(), Some("Docks"));

    assert_eq!(
        directions.waypoints[0].name.as_deref(),
        Some("Alpha Avenue")
    );
    assert_eq!(directions.waypoints[1].name.as_deref(), Some("Gamma Road"));

    // departing at local midnight, every absolute time sits at or after the
    // departure instant
    let epoch = departure_instant.timestamp();
    assert_eq!(directions.steps[0].arrive, epoch);
    assert!(directions.steps.iter().all(|step| step.arrive >= epoch));
    let arrives: Vec<i64> = directions.steps.iter().map(|step| step.arrive).collect();
    let mut sorted = arrives.clone();
    sorted.sort_unstable();
    assert_eq!(arrives, sorted);

    // the scheduled calls pin the ride step times exactly
    assert_eq!(directions.steps[4].arrive, epoch + 700);
    assert_eq!(directions.steps[5].arrive, epoch + 800);
    assert_eq!(directions.steps[6].arrive, epoch + 900);

    let first_arrive = directions.steps.first().unwrap().arrive;
    let last_arrive = directions.steps.last().unwrap().arrive;
    assert_eq!(directions.duration, (last_arrive - first_arrive) as u64);

    let summed: f64 = directions.steps.iter().map(|step| step.distance).sum();
    assert!((directions.distance - summed).abs() < 1e-6);
}

#[test]
fn transfer_tags_each_leg_with_its_own_trip() {
    init();
    let store = transfer_town();

    let departure_instant = departure(0);
    let request = PlanRequest {
        from: LonLat::new(0.0, 0.0),
        to: LonLat::new(0.005, 0.0),
        departure: departure_instant,
    };
    let directions = plan(&store, &request, &PlannerConfig::default())
        .unwrap()
        .expect("the two lines chain across the middle street");

    let kinds: Vec<ManeuverType> = directions
        .steps
        .iter()
        .map(|step| step.maneuver.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ManeuverType::Depart,
            ManeuverType::Turn,
            ManeuverType::Notification,
            ManeuverType::ExitVehicle,
            ManeuverType::Turn,
            ManeuverType::Notification,
            ManeuverType::ExitVehicle,
            ManeuverType::Arrive
        ]
    );

    let trip_of = |index: usize| {
        directions.steps[index]
            .trip
            .as_ref()
            .map(|trip| trip.id.as_str())
    };
    // boarding steps read the ride from the piece that follows them
    assert_eq!(trip_of(2), Some("t1"));
    assert_eq!(trip_of(5), Some("t2"));
    // each exit keeps its own trip, not the one that follows it
    assert_eq!(trip_of(3), Some("t1"));
    assert_eq!(trip_of(6), Some("t2"));

    assert_eq!(directions.steps[2].name.as_deref(), Some("Anchor Wharf"));
    assert_eq!(directions.steps[3].name.as_deref(), Some("Exchange"));
    assert_eq!(directions.steps[5].name.as_deref(), Some("Yard Gate"));
    assert_eq!(directions.steps[6].name.as_deref(), Some("Zenith Park"));

    // the waits close the gap between reaching each stop and its departure
    let epoch = departure_instant.timestamp();
    assert_eq!(
        directions.steps[2].wait,
        Some((epoch + 600 - directions.steps[2].arrive) as u64)
    );
    assert_eq!(
        directions.steps[5].wait,
        Some((epoch + 900 - directions.steps[5].arrive) as u64)
    );
    assert_eq!(directions.steps[3].wait, None);
    assert_eq!(directions.steps[6].wait, None);

    // the scheduled arrivals pin both alighting steps exactly
    assert_eq!(directions.steps[3].arrive, epoch + 700);
    assert_eq!(directions.steps[6].arrive, epoch + 1000);
}

#[test]
fn quiet_day_routes_on_foot_or_not_at_all() {
    init();
    let store = transit_town();

    // a Wednesday: line 9 only runs on Tuesdays
    let cross_cluster = PlanRequest {
        from: LonLat::new(0.0, 0.0),
        to: LonLat::new(0.014, 0.0),
        departure: departure_on(2021, 6, 16, 8 * 3600),
    };
    assert!(plan(&store, &cross_cluster, &PlannerConfig::default())
        .unwrap()
        .is_none());

    let within_cluster = PlanRequest {
        from: LonLat::new(0.0, 0.0),
        to: LonLat::new(0.004, 0.0),
        departure: departure_on(2021, 6, 16, 8 * 3600),
    };
    let directions = plan(&store, &within_cluster, &PlannerConfig::default())
        .unwrap()
        .expect("the western cluster walks without any service");
    assert!(directions.steps.iter().all(|step| step.mode == Mode::Walking));
}
