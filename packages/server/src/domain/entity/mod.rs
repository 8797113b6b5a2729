//! Entity 定義

mod notification;
mod participant;
mod profile;
mod ride_request;

pub use notification::{Notification, NotificationKind};
pub use participant::{DriverLocation, Participant};
pub use profile::{Driver, NewDriver, NewStudent, Student};
pub use ride_request::{DispatchMode, NewRideRequest, RideRequest, RideStatus};
