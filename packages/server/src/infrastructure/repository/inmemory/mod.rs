//! インメモリ実装
//!
//! プロセス内の `HashMap` をストレージとして使います。再起動するとデータは失われます。

mod directory;
mod notification;
mod participant;
mod ride_request;

pub use directory::InMemoryUserDirectory;
pub use notification::InMemoryNotificationRepository;
pub use participant::InMemoryParticipantRepository;
pub use ride_request::InMemoryRideRequestRepository;
