//! Render device implementations

pub mod recording;

pub use recording::{DeviceCall, RecordingDevice};
