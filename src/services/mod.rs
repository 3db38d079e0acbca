pub mod payment;
pub mod projection;
pub mod registration;
