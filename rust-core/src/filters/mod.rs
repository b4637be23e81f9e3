//! Window functions, Butterworth design and IIR filtering

pub mod windows;
pub mod design;
pub mod iir;
pub mod savgol;

pub use windows::{WindowType, generate_window, generate_periodic_window};
pub use design::{Butterworth, LowpassDesign, LowpassSpec, TransferFunction, butter_lowpass};
pub use iir::{IirFilter, lfilter};
pub use savgol::savgol_filter;
