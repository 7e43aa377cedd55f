//! HTTP/REST API layer for Threadline.
//!
//! Axum-based REST API at `/api/v1/` backing a browser chat widget, with
//! the envelope response format and permissive CORS.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
