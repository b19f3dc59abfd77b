mod aggregate_windows;
mod raw_readings;
