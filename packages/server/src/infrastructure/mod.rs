//! Infrastructure 層
//!
//! ドメイン層が定義する trait（Repository / MessagePusher / FareEstimator）の具体的な実装と、
//! ワイヤ形式（JSON）の DTO を提供します。

pub mod dto;
pub mod fare;
pub mod message_pusher;
pub mod repository;
