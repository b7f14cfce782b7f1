// Utility functions
pub mod error;
pub mod key;
pub mod key_lock;

pub use error::*;
pub use key::*;
pub use key_lock::*;
