//! Testing fixtures for brickflow layouts

pub mod data_source;
pub mod recording;

pub use data_source::*;
pub use recording::*;

/// Installs `env_logger` for the current test binary when the `logging`
/// feature is enabled. Safe to call from every test.
pub fn init_test_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::builder().is_test(true).try_init();
    }
}

pub mod prelude {
    pub use crate::data_source::*;
    pub use crate::init_test_logging;
    pub use crate::recording::*;
}
