//! Portfolio allocation advice from a small user profile: a fixed equity/debt/gold
//! split chosen by goal or age bracket, optionally enriched with fund NAVs and
//! stock quotes, and served as a JSON API with a static dashboard.

pub mod api;
pub mod clients;
pub mod config;
pub mod core;
pub mod error;

pub use error::{Error, Result};
