//! HTTP API for the glow coaching backend.
//!
//! Two surfaces share one router: the coach console under `/api/v1` (JWT
//! auth, role-gated) and the subscriber companion app under `/api/v1/app`
//! (per-profile API keys). Library form exists so integration tests can
//! build the router without binding a socket.

pub mod auth;
pub mod background;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
