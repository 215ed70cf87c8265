//! Utilities for creating `rodio` sinks from `Track` values.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` ready to start from the beginning.

use std::fs::File;
use std::io::BufReader;

use rodio::{Decoder, OutputStream, Sink};

use crate::library::Track;

use super::types::DeviceError;

/// Create a paused `Sink` for `track` on `stream`'s mixer.
pub(super) fn create_sink(stream: &OutputStream, track: &Track) -> Result<Sink, DeviceError> {
    let file = File::open(&track.path).map_err(|source| DeviceError::Open {
        path: track.path.clone(),
        source,
    })?;

    let source = Decoder::new(BufReader::new(file)).map_err(|e| DeviceError::Decode {
        path: track.path.clone(),
        reason: e.to_string(),
    })?;

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}
