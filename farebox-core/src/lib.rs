pub mod payment;
pub mod session;
pub mod validation;
