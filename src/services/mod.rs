pub mod contact_service;
pub mod notification_service;
pub mod tag_service;
pub mod user_service;
pub mod vote_service;

pub use contact_service::*;
pub use notification_service::*;
pub use tag_service::*;
pub use user_service::*;
pub use vote_service::*;
