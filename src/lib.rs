//! Core of the PerFolio gold savings app: the currency catalogue and USD
//! conversion, a JSON HTTP client, the session check that picks the first
//! screen, and the Fluid positions lookup.

pub mod api;
pub mod config;
pub mod error;
pub mod exchange_rates;
pub mod logging;
pub mod models;
pub mod positions;
pub mod route;
pub mod session;

pub use error::{Error, Result};
