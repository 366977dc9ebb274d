#![allow(dead_code)]

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use wayfarer::graph::{GraphBuilder, GraphStore};
use wayfarer::time::SecondsSinceDayStart;

pub fn init() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A Tuesday served by every fixture calendar.
pub const SERVICE_DAY: (i32, u32, u32) = (2021, 6, 15);

pub fn departure(seconds: u32) -> DateTime<Tz> {
    let (year, month, day) = SERVICE_DAY;
    chrono_tz::UTC
        .with_ymd_and_hms(year, month, day, 0, 0, 0)
        .unwrap()
        + chrono::Duration::seconds(seconds as i64)
}

pub fn departure_on(year: i32, month: u32, day: u32, seconds: u32) -> DateTime<Tz> {
    chrono_tz::UTC
        .with_ymd_and_hms(year, month, day, 0, 0, 0)
        .unwrap()
        + chrono::Duration::seconds(seconds as i64)
}

fn seconds(value: u32) -> SecondsSinceDayStart {
    SecondsSinceDayStart::from_seconds(value)
}

/// A walkable town with two named streets meeting at a corner, a stop on a
/// service that only runs on Mondays, and one unreachable island node.
///
/// Longitudes increase along the walk so coordinate snapping is exact.
pub fn walking_town() -> GraphStore {
    GraphBuilder::new()
        .node(1, (0.000, 0.0))
        .node(2, (0.001, 0.0))
        .node(3, (0.002, 0.0))
        .node(4, (0.002, 0.001))
        .node(9, (0.100, 0.0))
        .way(101, Some("Long Street"), &[1, 2, 3])
        .way(102, Some("Cross Lane"), &[3, 4])
        .stop("S", "Sparrow Corner", (0.001, 0.0))
        .route("r1", Some("Monday Flyer"))
        .service(
            "mondays",
            "2021-01-01".parse().unwrap(),
            "2021-12-31".parse().unwrap(),
            &[chrono::Weekday::Mon],
        )
        .trip("m1", "r1", "mondays")
        .stop_time("m1", "S", seconds(600), seconds(600), 1)
        .build()
        .unwrap()
}

/// One transit line bridging two road clusters that no footpath connects.
///
/// The western cluster walks along Station Road to stop A; the single trip
/// departs A at 600 and reaches stop B at 780, whose anchor opens onto
/// Harbor Road in the eastern cluster.
pub fn single_line() -> GraphStore {
    GraphBuilder::new()
        .node(1, (0.000, 0.0))
        .node(2, (0.001, 0.0))
        .node(3, (0.002, 0.0))
        .node(4, (0.003, 0.0))
        .way(101, Some("Station Road"), &[1, 2])
        .way(102, Some("Harbor Road"), &[3, 4])
        .stop("A", "Abbey", (0.001, 0.0))
        .stop("B", "Beacon", (0.002, 0.0))
        .agency("town", "Town Transit")
        .route("r1", Some("Line 1"))
        .service(
            "daily",
            "2021-01-01".parse().unwrap(),
            "2021-12-31".parse().unwrap(),
            &[
                chrono::Weekday::Mon,
                chrono::Weekday::Tue,
                chrono::Weekday::Wed,
                chrono::Weekday::Thu,
                chrono::Weekday::Fri,
            ],
        )
        .trip("t1", "r1", "daily")
        .stop_time("t1", "A", seconds(600), seconds(600), 1)
        .stop_time("t1", "B", seconds(780), seconds(780), 2)
        .build()
        .unwrap()
}

/// Two one-hop lines chained by a walk across a middle street: line 1 rides
/// from A to X, line 2 from Y to Z, and the three little road clusters are
/// only bridged by those rides.
pub fn transfer_town() -> GraphStore {
    GraphBuilder::new()
        .node(1, (0.000, 0.0))
        .node(2, (0.001, 0.0))
        .node(3, (0.002, 0.0))
        .node(4, (0.003, 0.0))
        .node(5, (0.004, 0.0))
        .node(6, (0.005, 0.0))
        .way(301, Some("West Way"), &[1, 2])
        .way(302, Some("Middle Way"), &[3, 4])
        .way(303, Some("East Way"), &[5, 6])
        .stop("A", "Anchor Wharf", (0.001, 0.0))
        .stop("X", "Exchange", (0.002, 0.0))
        .stop("Y", "Yard Gate", (0.003, 0.0))
        .stop("Z", "Zenith Park", (0.004, 0.0))
        .agency("town", "Town Transit")
        .route("r1", Some("Line 1"))
        .route("r2", Some("Line 2"))
        .service(
            "daily",
            "2021-01-01".parse().unwrap(),
            "2021-12-31".parse().unwrap(),
            &[
                chrono::Weekday::Mon,
                chrono::Weekday::Tue,
                chrono::Weekday::Wed,
                chrono::Weekday::Thu,
                chrono::Weekday::Fri,
            ],
        )
        .trip("t1", "r1", "daily")
        .trip("t2", "r2", "daily")
        .stop_time("t1", "A", seconds(600), seconds(600), 1)
        .stop_time("t1", "X", seconds(700), seconds(700), 2)
        .stop_time("t2", "Y", seconds(900), seconds(900), 1)
        .stop_time("t2", "Z", seconds(1000), seconds(1000), 2)
        .build()
        .unwrap()
}

/// The full multimodal scene: a walk with a street change, a four-stop ride
/// and a final walk, with the intermediate stops anchored to island nodes so
/// the clusters stay foot-disconnected.
pub fn transit_town() -> GraphStore {
    GraphBuilder::new()
        .node(1, (0.000, 0.0))
        .node(2, (0.001, 0.0))
        .node(3, (0.002, 0.0))
        .node(4, (0.003, 0.0))
        .node(5, (0.004, 0.0))
        .node(20, (0.010, 0.0))
        .node(21, (0.011, 0.0))
        .node(6, (0.012, 0.0))
        .node(7, (0.013, 0.0))
        .node(8, (0.014, 0.0))
        .way(201, Some("Alpha Avenue"), &[1, 2, 3])
        .way(202, Some("Beta Street"), &[3, 4, 5])
        .way(203, Some("Gamma Road"), &[6, 7, 8])
        .stop("A", "Arsenal", (0.004, 0.0))
        .stop("B", "Bakery", (0.010, 0.0))
        .stop("C", "Cathedral", (0.011, 0.0))
        .stop("D", "Docks", (0.012, 0.0))
        .agency("town", "Town Transit")
        .route("r9", Some("Line 9"))
        .service(
            "tuesdays",
            "2021-01-01".parse().unwrap(),
            "2021-12-31".parse().unwrap(),
            &[chrono::Weekday::Tue],
        )
        .trip("line9", "r9", "tuesdays")
        .stop_time("line9", "A", seconds(600), seconds(600), 1)
        .stop_time("line9", "B", seconds(700), seconds(710), 2)
        .stop_time("line9", "C", seconds(800), seconds(810), 3)
        .stop_time("line9", "D", seconds(900), seconds(900), 4)
        .build()
        .unwrap()
}
