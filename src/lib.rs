pub mod analyzers;
pub mod config;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod quality;
pub mod sample;
pub mod store;
