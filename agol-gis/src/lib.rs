//! # agol-gis
//!
//! Blocking ArcGIS REST client implementing [`agol_core::GisPlatform`].
//!
//! Call [`ArcGisClient::connect`] with the credentials resolved from the
//! secret store to obtain an authenticated session.

pub mod client;
mod responses;

pub use client::{ArcGisClient, ClientOptions};
