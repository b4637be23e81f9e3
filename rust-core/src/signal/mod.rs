//! Time-domain signals: synthetic sources and summary metrics

pub mod sequence;
pub mod tone;
pub mod metrics;

pub use sequence::Signal;
pub use tone::{generate_tone, ToneParams};
pub use metrics::{rms, rms_db, peak, RmsComparison};
