//! Support layers for working with the hub state.

mod write_tracking_layer;

pub use write_tracking_layer::{apply_if_ok, WriteTrackingState};
