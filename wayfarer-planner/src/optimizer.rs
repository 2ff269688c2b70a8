//! Nearest-neighbour route ordering.
//!
//! Small requests use a full matrix from the configured [`DistanceProvider`].
//! Requests above [`OptimizerConfig::proxy_threshold`] never reach the
//! provider; pairwise costs come from a [`HaversineProxy`] instead and the
//! resulting route is flagged approximate.

use std::sync::Arc;

use geo::Coord;
use thiserror::Error;
use wayfarer_core::{
    DistanceError, DistanceMatrix, DistanceProvider, HaversineProxy, Leg, OptimizationOptions,
    Point, Route, UsageMetrics, haversine_meters,
};

/// Point count above which the straight-line proxy replaces the provider.
pub const DEFAULT_PROXY_THRESHOLD: usize = 8;

/// Configuration for [`RouteOptimizer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerConfig {
    /// Largest request answered with a provider matrix.
    pub proxy_threshold: usize,
    /// Estimator used above the threshold and for unreachable legs.
    pub proxy: HaversineProxy,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            proxy_threshold: DEFAULT_PROXY_THRESHOLD,
            proxy: HaversineProxy::default(),
        }
    }
}

impl OptimizerConfig {
    /// Set the proxy threshold.
    #[must_use]
    pub const fn with_proxy_threshold(mut self, threshold: usize) -> Self {
        self.proxy_threshold = threshold;
        self
    }
}

/// Errors returned by [`RouteOptimizer::optimize`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptimizeError {
    /// The distance provider failed.
    #[error("distance data unavailable: {0}")]
    DistanceUnavailable(#[source] DistanceError),
    /// The provider answered but could route no pair at all.
    #[error("no reachable pairs among {points} points")]
    NoReachablePairs {
        /// Number of located points requested.
        points: usize,
    },
}

/// Orders points by repeatedly visiting the closest unvisited one.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::{HaversineProxy, OptimizationOptions, Point};
/// use wayfarer_planner::RouteOptimizer;
///
/// let optimizer = RouteOptimizer::new(HaversineProxy::default());
/// let points = vec![
///     Point::new(1, "Station", Coord { x: 0.0, y: 0.0 }),
///     Point::new(2, "Far", Coord { x: 0.05, y: 0.0 }),
///     Point::new(3, "Near", Coord { x: 0.01, y: 0.0 }),
/// ];
/// let route = optimizer.optimize(&points, &OptimizationOptions::default())?;
/// assert_eq!(route.order, vec![0, 2, 1]);
/// # Ok::<(), wayfarer_planner::OptimizeError>(())
/// ```
#[derive(Debug)]
pub struct RouteOptimizer<D> {
    provider: D,
    config: OptimizerConfig,
    metrics: Option<Arc<UsageMetrics>>,
}

impl<D> RouteOptimizer<D> {
    /// Optimiser with default configuration.
    pub fn new(provider: D) -> Self {
        Self::with_config(provider, OptimizerConfig::default())
    }

    /// Optimiser with explicit configuration.
    pub const fn with_config(provider: D, config: OptimizerConfig) -> Self {
        Self {
            provider,
            config,
            metrics: None,
        }
    }

    /// Record matrix usage in `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<UsageMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Active configuration.
    pub const fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Borrow the distance provider.
    pub const fn provider(&self) -> &D {
        &self.provider
    }
}

impl<D: DistanceProvider> RouteOptimizer<D> {
    /// Order `points` into a route.
    ///
    /// Points without coordinates are left out of the ordering and appended
    /// to [`Route::unresolved`]. The route starts at the first located point,
    /// or at the located point nearest `options.hotel_location` when set.
    ///
    /// # Errors
    /// Returns [`OptimizeError::DistanceUnavailable`] when the provider fails
    /// and [`OptimizeError::NoReachablePairs`] when its matrix has no usable
    /// off-diagonal entry.
    pub fn optimize(
        &self,
        points: &[Point],
        options: &OptimizationOptions,
    ) -> Result<Route, OptimizeError> {
        let (resolved, unresolved): (Vec<usize>, Vec<usize>) =
            (0..points.len()).partition(|&i| points.get(i).is_some_and(Point::is_resolved));
        if !unresolved.is_empty() {
            log::warn!(
                "{} point(s) without coordinates appended to the route",
                unresolved.len()
            );
        }
        if resolved.len() <= 1 {
            return Ok(Route::from_legs(resolved, Vec::new(), unresolved, false));
        }

        let located: Vec<Point> = resolved
            .iter()
            .filter_map(|&i| points.get(i).cloned())
            .collect();
        let coords: Vec<Coord<f64>> = located.iter().filter_map(|p| p.location).collect();
        let matrix = self.matrix_for(&located, options)?;

        let start = options
            .hotel_location
            .map_or(0, |hotel| nearest_to(hotel, &coords));
        let local_order = nearest_neighbour_order(&matrix, start);
        let legs = local_order
            .windows(2)
            .filter_map(|pair| match pair {
                &[a, b] => Some(self.leg(&matrix, &coords, &resolved, a, b)),
                _ => None,
            })
            .collect();
        let order = local_order
            .iter()
            .filter_map(|&local| resolved.get(local).copied())
            .collect();
        Ok(Route::from_legs(
            order,
            legs,
            unresolved,
            matrix.is_approximate(),
        ))
    }

    fn matrix_for(
        &self,
        located: &[Point],
        options: &OptimizationOptions,
    ) -> Result<DistanceMatrix, OptimizeError> {
        let mode = options.travel_mode;
        let n = located.len();
        let estimated = if n > self.config.proxy_threshold {
            log::info!(
                "{n} points exceed proxy threshold {}; estimating {mode} travel from straight-line distance",
                self.config.proxy_threshold
            );
            if let Some(metrics) = &self.metrics {
                metrics.record_proxy_matrix();
            }
            self.config.proxy.distance_matrix(located, mode)
        } else {
            log::debug!("requesting {n}x{n} {mode} matrix from distance provider");
            if let Some(metrics) = &self.metrics {
                metrics.record_provider_matrix();
            }
            self.provider.distance_matrix(located, mode)
        };
        let matrix = estimated.map_err(OptimizeError::DistanceUnavailable)?;

        matrix
            .ensure_len(n)
            .map_err(|err| OptimizeError::DistanceUnavailable(err.into()))?;
        if matrix.reachable_pairs() == 0 {
            return Err(OptimizeError::NoReachablePairs { points: n });
        }
        Ok(matrix)
    }

    fn leg(
        &self,
        matrix: &DistanceMatrix,
        coords: &[Coord<f64>],
        resolved: &[usize],
        from: usize,
        to: usize,
    ) -> Leg {
        let measured = matrix.entry(from, to);
        let entry = measured.or_else(|| {
            let (a, b) = (coords.get(from)?, coords.get(to)?);
            Some(self.config.proxy.estimate(*a, *b, matrix.mode()))
        });
        Leg {
            from: resolved.get(from).copied().unwrap_or(from),
            to: resolved.get(to).copied().unwrap_or(to),
            duration: entry.map(|e| e.duration).unwrap_or_default(),
            distance_meters: entry.map_or(0, |e| e.distance_meters),
            estimated: measured.is_none(),
        }
    }
}

/// Visit order produced by the nearest-neighbour heuristic over `matrix`.
///
/// Starts at `start` and repeatedly moves to the unvisited point with the
/// shortest travel time; ties go to the lower index. Unreachable candidates
/// are only taken once no reachable one remains, lowest index first. The
/// result is deterministic for a given matrix.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use wayfarer_core::{DistanceMatrix, MatrixEntry, TravelMode};
/// use wayfarer_planner::nearest_neighbour_order;
///
/// let secs = |s| Some(MatrixEntry::new(Duration::from_secs(s), s * 10));
/// let matrix = DistanceMatrix::new(
///     TravelMode::Walking,
///     vec![
///         vec![secs(0), secs(50), secs(10)],
///         vec![secs(50), secs(0), secs(20)],
///         vec![secs(10), secs(20), secs(0)],
///     ],
/// )?;
/// assert_eq!(nearest_neighbour_order(&matrix, 0), vec![0, 2, 1]);
/// # Ok::<(), wayfarer_core::MatrixError>(())
/// ```
#[must_use]
pub fn nearest_neighbour_order(matrix: &DistanceMatrix, start: usize) -> Vec<usize> {
    let n = matrix.len();
    if start >= n {
        return Vec::new();
    }
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut current = start;
    loop {
        if let Some(slot) = visited.get_mut(current) {
            *slot = true;
        }
        order.push(current);
        let next = (0..n)
            .filter(|&j| !visited.get(j).copied().unwrap_or(true))
            .min_by_key(|&j| {
                matrix
                    .entry(current, j)
                    .map_or((true, std::time::Duration::ZERO), |e| (false, e.duration))
            });
        match next {
            Some(j) => current = j,
            None => break,
        }
    }
    order
}

fn nearest_to(target: Coord<f64>, coords: &[Coord<f64>]) -> usize {
    coords
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            haversine_meters(target, **a).total_cmp(&haversine_meters(target, **b))
        })
        .map_or(0, |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::time::Duration;
    use wayfarer_core::test_support::{StubDistanceProvider, grid_points, point, unresolved_point};
    use wayfarer_core::{MatrixEntry, TravelMode};

    #[fixture]
    fn options() -> OptimizationOptions {
        OptimizationOptions::default()
    }

    fn permutation(route: &Route, n: usize) -> bool {
        let mut seen: Vec<usize> = route.visit_order().collect();
        seen.sort_unstable();
        seen == (0..n).collect::<Vec<_>>()
    }

    #[rstest]
    fn single_point_route_has_no_travel(options: OptimizationOptions) {
        let optimizer = RouteOptimizer::new(StubDistanceProvider::with_uniform(60));
        let route = optimizer
            .optimize(&[point(1, 0.0, 0.0)], &options)
            .expect("route");
        assert_eq!(route.order, vec![0]);
        assert_eq!(route.total_travel_time, Duration::ZERO);
        assert_eq!(optimizer.provider().calls(), 0);
    }

    #[rstest]
    fn empty_input_yields_empty_route(options: OptimizationOptions) {
        let optimizer = RouteOptimizer::new(StubDistanceProvider::with_uniform(60));
        let route = optimizer.optimize(&[], &options).expect("route");
        assert!(route.is_empty());
    }

    #[rstest]
    fn follows_the_nearest_neighbour(options: OptimizationOptions) {
        let provider = StubDistanceProvider::with_seconds(vec![
            vec![Some(0), Some(900), Some(300), Some(600)],
            vec![Some(900), Some(0), Some(400), Some(100)],
            vec![Some(300), Some(400), Some(0), Some(200)],
            vec![Some(600), Some(100), Some(200), Some(0)],
        ]);
        let optimizer = RouteOptimizer::new(provider);
        let points = grid_points(4, 0.01);
        let route = optimizer.optimize(&points, &options).expect("route");

        assert_eq!(route.order, vec![0, 2, 3, 1]);
        assert_eq!(route.total_travel_time, Duration::from_secs(600));
        assert_eq!(route.total_distance_meters, 6000);
        assert!(!route.approximate);
        assert!(route.legs.iter().all(|leg| !leg.estimated));
    }

    #[rstest]
    fn ties_go_to_input_order(options: OptimizationOptions) {
        let optimizer = RouteOptimizer::new(StubDistanceProvider::with_uniform(120));
        let route = optimizer
            .optimize(&grid_points(5, 0.01), &options)
            .expect("route");
        assert_eq!(route.order, vec![0, 1, 2, 3, 4]);
    }

    #[rstest]
    fn unresolved_points_are_appended(options: OptimizationOptions) {
        let points = vec![
            point(1, 0.0, 0.0),
            unresolved_point(2),
            point(3, 0.01, 0.0),
        ];
        let optimizer = RouteOptimizer::new(StubDistanceProvider::with_uniform(60));
        let route = optimizer.optimize(&points, &options).expect("route");
        assert_eq!(route.order, vec![0, 2]);
        assert_eq!(route.unresolved, vec![1]);
        assert!(permutation(&route, 3));
        assert_eq!(optimizer.provider().largest_request(), 2);
    }

    #[rstest]
    fn provider_failure_is_distance_unavailable(options: OptimizationOptions) {
        let error = DistanceError::ServiceError {
            code: "NoTable".to_owned(),
            message: "quota exceeded".to_owned(),
        };
        let optimizer = RouteOptimizer::new(StubDistanceProvider::with_error(error.clone()));
        let result = optimizer.optimize(&grid_points(3, 0.01), &options);
        assert_eq!(result, Err(OptimizeError::DistanceUnavailable(error)));
    }

    #[rstest]
    fn all_pairs_unreachable_is_an_error(options: OptimizationOptions) {
        let optimizer = RouteOptimizer::new(StubDistanceProvider::with_seconds(vec![
            vec![Some(0), None, None],
            vec![None, Some(0), None],
            vec![None, None, Some(0)],
        ]));
        let result = optimizer.optimize(&grid_points(3, 0.01), &options);
        assert_eq!(result, Err(OptimizeError::NoReachablePairs { points: 3 }));
    }

    #[rstest]
    fn wrong_sized_matrix_is_rejected(options: OptimizationOptions) {
        let optimizer = RouteOptimizer::new(StubDistanceProvider::with_seconds(vec![
            vec![Some(0), Some(60)],
            vec![Some(60), Some(0)],
        ]));
        let result = optimizer.optimize(&grid_points(3, 0.01), &options);
        assert!(matches!(result, Err(OptimizeError::DistanceUnavailable(_))));
    }

    #[rstest]
    fn unreachable_legs_are_estimated(options: OptimizationOptions) {
        let optimizer = RouteOptimizer::new(StubDistanceProvider::with_seconds(vec![
            vec![Some(0), Some(60), None],
            vec![Some(60), Some(0), None],
            vec![None, None, Some(0)],
        ]));
        let route = optimizer
            .optimize(&grid_points(3, 0.01), &options)
            .expect("route");
        assert_eq!(route.order, vec![0, 1, 2]);
        let last = route.legs.last().expect("leg");
        assert!(last.estimated);
        assert!(last.duration > Duration::ZERO);
        assert!(!route.legs.first().expect("leg").estimated);
    }

    #[rstest]
    #[case(8, 1)]
    #[case(9, 0)]
    #[case(25, 0)]
    fn proxy_threshold_decides_provider_use(
        options: OptimizationOptions,
        #[case] n: u64,
        #[case] provider_calls: usize,
    ) {
        let optimizer = RouteOptimizer::new(StubDistanceProvider::with_uniform(60));
        let points = grid_points(n, 0.005);
        let route = optimizer.optimize(&points, &options).expect("route");
        assert_eq!(optimizer.provider().calls(), provider_calls);
        assert_eq!(route.approximate, provider_calls == 0);
        assert!(permutation(&route, points.len()));
    }

    #[rstest]
    fn threshold_is_configurable(options: OptimizationOptions) {
        let config = OptimizerConfig::default().with_proxy_threshold(2);
        let optimizer =
            RouteOptimizer::with_config(StubDistanceProvider::with_uniform(60), config);
        optimizer
            .optimize(&grid_points(3, 0.01), &options)
            .expect("route");
        assert_eq!(optimizer.provider().calls(), 0);
    }

    #[rstest]
    fn hotel_picks_the_starting_point(options: OptimizationOptions) {
        let points = vec![point(1, 0.0, 0.0), point(2, 0.02, 0.0), point(3, 0.04, 0.0)];
        let optimizer = RouteOptimizer::new(HaversineProxy::default());
        let route = optimizer
            .optimize(
                &points,
                &options.with_hotel_location(Coord { x: 0.041, y: 0.0 }),
            )
            .expect("route");
        assert_eq!(route.order, vec![2, 1, 0]);
    }

    #[rstest]
    fn metrics_count_matrix_sources(options: OptimizationOptions) {
        let metrics = Arc::new(UsageMetrics::default());
        let optimizer = RouteOptimizer::new(StubDistanceProvider::with_uniform(60))
            .with_metrics(Arc::clone(&metrics));
        optimizer
            .optimize(&grid_points(3, 0.01), &options)
            .expect("provider route");
        optimizer
            .optimize(&grid_points(12, 0.01), &options)
            .expect("proxy route");
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.provider_matrices, 1);
        assert_eq!(snapshot.proxy_matrices, 1);
    }

    #[rstest]
    fn fixed_matrix_is_followed_verbatim() {
        let leg = |s: u64| Some(MatrixEntry::new(Duration::from_secs(s), s));
        let matrix = DistanceMatrix::new(
            TravelMode::Driving,
            vec![
                vec![leg(0), leg(5), leg(5)],
                vec![leg(5), leg(0), leg(1)],
                vec![leg(5), leg(1), leg(0)],
            ],
        )
        .expect("matrix");
        assert_eq!(nearest_neighbour_order(&matrix, 0), vec![0, 1, 2]);
        assert_eq!(nearest_neighbour_order(&matrix, 2), vec![2, 1, 0]);
        assert!(nearest_neighbour_order(&matrix, 3).is_empty());
    }
}
