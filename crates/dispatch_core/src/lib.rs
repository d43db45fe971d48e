pub mod clock;
pub mod spatial;
pub mod model;
pub mod params;
pub mod records;
pub mod routing;
pub mod distance;
pub mod matching;
pub mod scheduler;
pub mod metrics;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;
