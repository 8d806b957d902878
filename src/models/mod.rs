pub mod appointment;
pub mod enums;
pub mod patient;
pub mod schedule;
pub mod service;

pub use appointment::*;
pub use enums::*;
pub use patient::*;
pub use schedule::*;
pub use service::*;
