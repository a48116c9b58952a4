//! Value Object Module

pub mod email;
pub mod user_password;
pub mod user_role;
pub mod username;
