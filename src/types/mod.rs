//! Type definitions

pub mod messages;
pub mod route;
pub mod stop;

pub use messages::*;
pub use route::*;
pub use stop::*;
