pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod params;
pub mod service;
pub mod slot;
pub mod store;
pub mod tester;
pub mod validator;
