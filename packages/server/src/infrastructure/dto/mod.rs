//! Data Transfer Objects (DTOs) for the ride matching service.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket message DTOs
//! - `http`: HTTP API request / response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
