pub mod components;
pub mod config;
pub mod context;
pub mod error;
pub mod shutdown;
pub mod startup;
pub mod sync;
