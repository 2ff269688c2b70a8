//! Behavioural tests for [`HttpDistanceProvider`] against a canned local
//! server standing in for OSRM.

mod support;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::time::Duration;
use support::{CannedServer, Reply};
use wayfarer_core::test_support::point;
use wayfarer_core::{DistanceError, DistanceMatrix, DistanceProvider, MatrixEntry, TravelMode};
use wayfarer_data::{HttpDistanceProvider, HttpDistanceProviderConfig, RetryPolicy};

type ResultCell = RefCell<Option<Result<DistanceMatrix, DistanceError>>>;

const TABLE_OK: &str = r#"{
    "code": "Ok",
    "durations": [[0.0, 600.0], [620.0, 0.0]],
    "distances": [[0.0, 800.0], [820.0, 0.0]]
}"#;

#[fixture]
fn server() -> RefCell<Option<CannedServer>> {
    RefCell::new(None)
}

#[fixture]
fn result() -> ResultCell {
    RefCell::new(None)
}

fn start(server: &RefCell<Option<CannedServer>>, replies: Vec<Reply>) {
    *server.borrow_mut() = Some(CannedServer::start(replies));
}

fn hits(server: &RefCell<Option<CannedServer>>) -> usize {
    server.borrow().as_ref().expect("server must be running").hits()
}

// --- Given steps ---

#[given("a routing service returning durations and distances")]
fn service_ok(#[from(server)] server: &RefCell<Option<CannedServer>>) {
    start(server, vec![Reply::ok(TABLE_OK)]);
}

#[given("a routing service that is unavailable once")]
fn service_flaky(#[from(server)] server: &RefCell<Option<CannedServer>>) {
    start(
        server,
        vec![Reply::status(503, r#"{"code":"Busy"}"#), Reply::ok(TABLE_OK)],
    );
}

#[given("a routing service rejecting the request")]
fn service_bad_request(#[from(server)] server: &RefCell<Option<CannedServer>>) {
    start(server, vec![Reply::status(400, r#"{"code":"InvalidUrl"}"#)]);
}

#[given("a routing service returning an error code")]
fn service_error_code(#[from(server)] server: &RefCell<Option<CannedServer>>) {
    start(
        server,
        vec![Reply::ok(
            r#"{"code":"NoTable","message":"No route found"}"#,
        )],
    );
}

#[given("a routing service returning null for unreachable pairs")]
fn service_nulls(#[from(server)] server: &RefCell<Option<CannedServer>>) {
    start(
        server,
        vec![Reply::ok(
            r#"{"code":"Ok","durations":[[0.0,null],[null,0.0]]}"#,
        )],
    );
}

// --- When steps ---

#[when("I request a walking matrix for two spots")]
fn request_walking(
    #[from(server)] server: &RefCell<Option<CannedServer>>,
    #[from(result)] result: &ResultCell,
) {
    let guard = server.borrow();
    let canned = guard.as_ref().expect("server must be running");
    let config = HttpDistanceProviderConfig::new(canned.base_url())
        .with_timeout(Duration::from_secs(5))
        .with_retry(RetryPolicy::new(
            3,
            Duration::from_millis(10),
            Duration::from_millis(50),
        ));
    let provider = HttpDistanceProvider::with_config(config).expect("provider should build");
    let points = [point(1, 135.72, 35.03), point(2, 135.79, 35.02)];
    *result.borrow_mut() = Some(provider.distance_matrix(&points, TravelMode::Walking));
}

// --- Then steps ---

#[then("a 2x2 matrix with distances is returned")]
fn then_matrix(#[from(result)] result: &ResultCell) {
    let borrowed = result.borrow();
    let matrix = borrowed
        .as_ref()
        .expect("request must have run")
        .as_ref()
        .expect("expected Ok result");
    assert_eq!(matrix.len(), 2);
    assert_eq!(matrix.mode(), TravelMode::Walking);
    assert_eq!(
        matrix.entry(0, 1),
        Some(MatrixEntry::new(Duration::from_secs(600), 800))
    );
    assert_eq!(
        matrix.entry(1, 0),
        Some(MatrixEntry::new(Duration::from_secs(620), 820))
    );
}

#[then("the walking profile was requested once")]
fn then_walking_profile(#[from(server)] server: &RefCell<Option<CannedServer>>) {
    let guard = server.borrow();
    let canned = guard.as_ref().expect("server must be running");
    let requests = canned.requests();
    assert_eq!(requests.len(), 1);
    let first = requests.first().expect("one request");
    assert!(
        first.starts_with("GET /table/v1/foot/135.72,35.03;135.79,35.02?annotations=duration,distance"),
        "unexpected request: {first}"
    );
}

#[then("the service was called twice")]
fn then_called_twice(#[from(server)] server: &RefCell<Option<CannedServer>>) {
    assert_eq!(hits(server), 2);
}

#[then("the service was called once")]
fn then_called_once(#[from(server)] server: &RefCell<Option<CannedServer>>) {
    assert_eq!(hits(server), 1);
}

#[then("an HTTP 400 error is returned")]
fn then_http_error(#[from(result)] result: &ResultCell) {
    let borrowed = result.borrow();
    assert!(
        matches!(
            borrowed.as_ref(),
            Some(Err(DistanceError::HttpError { status: 400, .. }))
        ),
        "expected HTTP 400, got {borrowed:?}"
    );
}

#[then("a service error is returned")]
fn then_service_error(#[from(result)] result: &ResultCell) {
    let borrowed = result.borrow();
    assert!(
        matches!(
            borrowed.as_ref(),
            Some(Err(DistanceError::ServiceError { code, .. })) if code == "NoTable"
        ),
        "expected ServiceError, got {borrowed:?}"
    );
}

#[then("the off-diagonal pairs are unreachable")]
fn then_unreachable(#[from(result)] result: &ResultCell) {
    let borrowed = result.borrow();
    let matrix = borrowed
        .as_ref()
        .expect("request must have run")
        .as_ref()
        .expect("expected Ok result");
    assert_eq!(matrix.entry(0, 1), None);
    assert_eq!(matrix.entry(1, 0), None);
    assert_eq!(matrix.reachable_pairs(), 0);
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/http_distance.feature", name = $title)]
        fn $fn_name(server: RefCell<Option<CannedServer>>, result: ResultCell) {
            let _ = (server, result);
        }
    };
}

register_scenario!(returning_matrix, "returning a matrix with distances");
register_scenario!(
    retrying_unavailable_service,
    "retrying a temporarily unavailable service"
);
register_scenario!(giving_up_on_bad_request, "giving up on a bad request");
register_scenario!(reporting_service_error, "reporting a service error code");
register_scenario!(
    treating_nulls_as_unreachable,
    "treating null durations as unreachable"
);
