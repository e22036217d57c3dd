//! HTTP request handlers for the token server
//!
//! - `api` - Root liveness message
//! - `connection` - LiveKit connection details for the frontend

pub mod api;
pub mod connection;

pub use connection::{ConnectionDetails, connection_details};
