//! Bundled scripts run by `gcvm demo [name]`.

/// `(name, source)` pairs in the order the demo runs them.
pub const SCENARIOS: &[(&str, &str)] = &[
    ("scenario_a", include_str!("../../fixtures/scenario_a.gcs")),
    ("scenario_b", include_str!("../../fixtures/scenario_b.gcs")),
    ("scenario_c", include_str!("../../fixtures/scenario_c.gcs")),
    ("scenario_d", include_str!("../../fixtures/scenario_d.gcs")),
    ("churn", include_str!("../../fixtures/churn.gcs")),
];

/// Looks up a bundled script by name.
pub fn find(name: &str) -> Option<&'static str> {
    SCENARIOS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, source)| *source)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    SCENARIOS.iter().map(|(name, _)| *name)
}
