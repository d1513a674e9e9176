//! Configuration module

mod study;

pub use study::HighlightConfig;
pub use study::Mode;
pub use study::StudyConfig;
pub use study::CONFIG_FILE;
