//! Entity Module

pub mod category;
pub mod comment;
pub mod post;
pub mod tag;
