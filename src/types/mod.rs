//! Type definitions

pub mod calendar;
pub mod clock;
pub mod group;
pub mod messages;
pub mod schedule;
pub mod session;

pub use calendar::*;
pub use group::*;
pub use messages::*;
pub use schedule::*;
pub use session::*;
