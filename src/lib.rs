pub mod config;
pub mod feed;
pub mod harness;
pub mod logging;
pub mod report;
pub mod schema;
pub mod sensor;
