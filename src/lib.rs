pub mod app;
pub mod config;
pub mod cpu;
pub mod driver;
pub mod graphics;
pub mod pointer;
pub mod snapshot;
