//! # atelier-api
//!
//! HTTP layer for the atelier project registry: configuration, error
//! mapping, server assembly, and route handlers. The API serves the admin
//! dashboard and the front-end application that consume project documents.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod server;
