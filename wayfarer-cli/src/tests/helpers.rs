//! Test helpers for writing plan requests and wiring stub planners.

use super::*;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;
use wayfarer_core::test_support::{StubDistanceProvider, StubRecommendationProvider};
use wayfarer_core::{DistanceError, InMemorySessionStore};
use wayfarer_planner::{ItineraryService, Orchestrator};

/// A plan request covering three spots in Kyoto.
pub(super) const VALID_REQUEST: &str = r#"{
    "sessionId": "cli-session",
    "city": "Kyoto",
    "selectedSpots": [
        {"id": 1, "name": "Kinkaku-ji", "location": {"x": 135.7292, "y": 35.0394}},
        {"id": 2, "name": "Ryoan-ji", "location": {"x": 135.7183, "y": 35.0345}},
        {"id": 3, "name": "Ninna-ji", "location": {"x": 135.7137, "y": 35.0310}}
    ],
    "travelMode": "walking",
    "startTime": "09:00",
    "includeBreaks": false
}"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path, contents).expect("write test file");
}

/// Temporary workspace holding a request path.
pub(super) fn request_workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    let request_path = root.join("request.json");
    (tmp, request_path)
}

/// Builds planners from test stubs instead of network adapters.
#[derive(Debug, Clone, Copy)]
pub(super) struct StubPlanServiceBuilder {
    pub(super) failing_distances: bool,
}

impl PlanServiceBuilder for StubPlanServiceBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn Planner>, CliError> {
        let provider = if self.failing_distances {
            StubDistanceProvider::with_error(DistanceError::NetworkError {
                url: "http://osrm.test".to_owned(),
                message: "connection refused".to_owned(),
            })
        } else {
            StubDistanceProvider::with_uniform(600)
        };
        let recommender = StubRecommendationProvider::with_text(
            "Day 1\n09:00-10:00 Kinkaku-ji\n10:30-11:30 Ryoan-ji\n12:00-13:00 Ninna-ji",
        );
        let orchestrator = Orchestrator::with_config(
            provider,
            recommender,
            config.orchestrator_config(),
            std::sync::Arc::default(),
        );
        Ok(Box::new(ItineraryService::new(
            orchestrator,
            InMemorySessionStore::default(),
        )))
    }
}
