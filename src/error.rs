//! Error types for the track visualization core.

use thiserror::Error;

/// Errors raised at the boundaries of the core (track replacement and
/// configuration persistence). Query operations never fail; they return
/// `Option` or fall back to fixed tie-breaks instead.
#[derive(Error, Debug)]
pub enum TrackError {
    /// Reading or writing a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration record could not be (de)serialized.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Sample times are not ascending.
    #[error("track is not sorted by time: sample {index} precedes its predecessor")]
    UnsortedTrack {
        /// Index of the first offending sample.
        index: usize,
    },

    /// A configuration record refers to a quantity that does not exist.
    #[error("unknown quantity: {0}")]
    UnknownQuantity(String),
}
