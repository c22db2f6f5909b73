pub mod config;
pub mod config_processors;
pub mod error;
pub mod evaluation;
pub mod io;
pub mod knn;
pub mod metrics;
pub mod pipeline;
pub mod recommend;
pub mod reviews;
pub mod stopwatch;
