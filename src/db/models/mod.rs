pub mod aggregate_window;
pub mod raw_reading;

pub use aggregate_window::AggregateWindow;
pub use raw_reading::RawReading;
