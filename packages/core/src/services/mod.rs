//! Transport collaborators used by the monitor.

pub mod http_probe;

pub use http_probe::HttpProber;
