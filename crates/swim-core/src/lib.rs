pub mod error;
pub mod id;
pub mod tolerance;
pub mod traits;

pub use error::{Result, SwimError};
pub use id::InstanceId;
pub use tolerance::Tolerance;
