//! The built-in detector catalog, spanning every pattern category.

pub mod accessibility;
pub mod api;
pub mod auth;
pub mod data_access;
pub mod documentation;
pub mod errors;
pub mod logging;
pub mod observability;
pub mod performance;
pub mod security;
pub mod structural;
pub mod testing;

use super::traits::Detector;

/// Every built-in detector, in registration order.
pub fn all() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(api::RestRouteDetector::new()),
        Box::new(api::ApiVersioningDetector::new()),
        Box::new(auth::AuthMiddlewareDetector::new()),
        Box::new(auth::TokenHandlingDetector::new()),
        Box::new(data_access::OrmUsageDetector),
        Box::new(data_access::RawSqlDetector::new()),
        Box::new(logging::LoggingStyleDetector::new()),
        Box::new(errors::ErrorTaxonomyDetector::new()),
        Box::new(errors::EmptyCatchDetector::new()),
        Box::new(performance::QueryInLoopDetector::new()),
        Box::new(performance::BlockingIoDetector::new()),
        Box::new(documentation::PublicDocDetector),
        Box::new(accessibility::ImageAltDetector::new()),
        Box::new(accessibility::AriaUsageDetector::new()),
        Box::new(security::HardcodedSecretDetector::new()),
        Box::new(security::CorsWildcardDetector::new()),
        Box::new(testing::TestNamingDetector::new()),
        Box::new(testing::AssertionStyleDetector::new()),
        Box::new(structural::ModuleSizeDetector),
        Box::new(structural::BarrelExportDetector),
        Box::new(observability::MetricsDetector::new()),
        Box::new(observability::TraceSpanDetector::new()),
    ]
}

#[cfg(test)]
mod tests {
    use drift_core::types::pattern::PatternCategory;

    #[test]
    fn catalog_covers_every_category() {
        let detectors = super::all();
        for category in PatternCategory::all() {
            assert!(
                detectors.iter().any(|d| d.category() == *category),
                "no detector registered for category {category}"
            );
        }
    }

    #[test]
    fn detector_ids_are_unique() {
        let detectors = super::all();
        let mut seen = std::collections::HashSet::new();
        for d in &detectors {
            assert!(seen.insert(d.id()), "duplicate detector id {}", d.id());
        }
    }
}
