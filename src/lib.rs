pub mod banner;
pub mod collector;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod events;
pub mod logging;
pub mod pipeline;
pub mod rates;
pub mod retry;
pub mod stages;
pub mod state;
