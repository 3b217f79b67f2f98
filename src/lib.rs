//! Library exports for the UTM generator
//!
//! `taxonomy`, `builder`, `validator`, `dedup` and `filter` hold the
//! generator logic; `handler` and `route` expose it over axum.

pub mod builder;
pub mod config;
pub mod database;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod handler;
pub mod model;
pub mod route;
pub mod taxonomy;
pub mod validator;
