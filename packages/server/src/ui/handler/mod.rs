//! Request handlers.

mod command;
mod http;
mod websocket;

pub use http::{
    create_driver, create_student, get_driver, get_driver_by_phone, get_fare, get_notifications,
    get_ride, get_student, get_student_by_email, health_check, list_available_drivers,
    list_drivers, list_students, update_driver_status,
};
pub use websocket::websocket_handler;
