//! Property-based tests for route ordering and day scheduling.
//!
//! # Invariants tested
//!
//! - **Permutation:** every located spot appears exactly once in the route.
//! - **Determinism:** the same input always yields the same order.
//! - **Matrix size:** the provider never sees more spots than the proxy
//!   threshold.
//! - **Monotonic days:** within a day, no item starts before the previous one
//!   ends.
//! - **Day reset:** day one opens at its resolved start and every later day
//!   opens at the daily start time.
//! - **Late arrival:** only a first stop that fits no day stays on day one.
//! - **Day end:** no item departs after the daily end time.


use std::collections::BTreeSet;

use proptest::prelude::*;
use wayfarer_core::test_support::StubDistanceProvider;
use wayfarer_planner::{DEFAULT_PROXY_THRESHOLD, RouteOptimizer, ScheduleBuilder};

use proptest_support::{days, options_strategy, spot_set_strategy};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the route visits each located spot exactly once.
    #[test]
    fn route_is_a_permutation(spots in spot_set_strategy(2, 20), options in options_strategy()) {
        let optimizer = RouteOptimizer::new(StubDistanceProvider::with_uniform(600));
        let route = optimizer.optimize(&spots, &options).expect("route");

        let visited: BTreeSet<usize> = route.visit_order().collect();
        prop_assert_eq!(route.len(), spots.len());
        prop_assert_eq!(visited, (0..spots.len()).collect::<BTreeSet<_>>());
        prop_assert_eq!(route.legs.len(), spots.len() - 1);
    }

    /// Property: optimisation is deterministic.
    #[test]
    fn ordering_is_deterministic(spots in spot_set_strategy(2, 20), options in options_strategy()) {
        let optimizer = RouteOptimizer::new(StubDistanceProvider::with_uniform(600));
        let first = optimizer.optimize(&spots, &options).expect("route");
        let second = optimizer.optimize(&spots, &options).expect("route");
        prop_assert_eq!(first, second);
    }

    /// Property: requests above the threshold never reach the provider.
    #[test]
    fn provider_matrix_stays_small(spots in spot_set_strategy(2, 30), options in options_strategy()) {
        let optimizer = RouteOptimizer::new(StubDistanceProvider::with_uniform(600));
        let route = optimizer.optimize(&spots, &options).expect("route");

        prop_assert!(optimizer.provider().largest_request() <= DEFAULT_PROXY_THRESHOLD);
        prop_assert_eq!(route.approximate, spots.len() > DEFAULT_PROXY_THRESHOLD);
    }

    /// Property: schedules are ordered, reset each day and end on time.
    #[test]
    fn schedule_respects_day_bounds(spots in spot_set_strategy(1, 25), options in options_strategy()) {
        let optimizer = RouteOptimizer::new(StubDistanceProvider::with_uniform(900));
        let route = optimizer.optimize(&spots, &options).expect("route");
        let items = ScheduleBuilder::default()
            .build(&spots, &route, &options)
            .expect("schedule");

        let visits = items.iter().filter(|item| item.is_visit()).count();
        prop_assert_eq!(visits, spots.len());

        let grouped = days(&items);
        let first_day = items.first().map_or(1, |item| item.day);
        prop_assert!(first_day == 1 || first_day == 2);
        for (expected_day, day) in (first_day..).zip(&grouped) {
            let first = day.first().expect("non-empty day");
            prop_assert_eq!(first.day, expected_day);
            prop_assert!(first.is_visit());
            let opening = if expected_day == 1 {
                options.first_day_start()
            } else {
                options.later_day_start()
            };
            prop_assert_eq!(first.arrival, opening);
            prop_assert!(first.day_marker.is_some());

            for pair in day.windows(2) {
                if let [earlier, later] = pair {
                    prop_assert!(later.arrival >= earlier.departure);
                }
            }
            for item in day {
                prop_assert!(item.arrival <= item.departure);
                prop_assert!(item.departure <= options.day_end());
            }
        }
    }
}
