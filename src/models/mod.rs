pub mod outcome;
pub mod user;
pub mod vote;

pub use outcome::*;
pub use user::*;
pub use vote::*;
