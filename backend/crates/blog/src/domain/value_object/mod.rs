//! Value Object Module

pub mod id_or_slug;
pub mod slug;
