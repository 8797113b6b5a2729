//! 運賃見積もりの実装

pub mod campus;

pub use campus::CampusFareTable;
