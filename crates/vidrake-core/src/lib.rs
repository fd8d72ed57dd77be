pub mod config;
pub mod logging;

pub mod convert;
pub mod downloader;
pub mod harvest;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod storage;
pub mod url_model;
