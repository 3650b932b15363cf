//! triptych-gateway — HTTP surface for the comparison engine
//!
//! Exposes `POST /api/compare` and a `GET /health` liveness probe over an
//! Axum server. All comparison logic lives in `triptych-core`; this crate
//! only adapts the wire.

pub mod server;

pub use server::{AppState, CompareBody, Server};
