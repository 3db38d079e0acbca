pub mod event;
pub mod registration;
pub mod student;

pub use event::{Event, EventPatch, NewEvent};
pub use registration::{NewRegistration, Registration};
pub use student::{NewStudent, Student};
