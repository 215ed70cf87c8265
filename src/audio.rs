//! Audio output: the transport contract and its `rodio` implementation.

mod output;
mod sink;
mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use output::{RodioDevice, probe_duration};
pub use types::{AudioDevice, DeviceError, EndSignal, TrackEnd};
