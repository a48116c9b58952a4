//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random tokens, SHA-256, constant-time compare)
//! - Password hashing (Argon2id) and password policy
//! - JWT issuing and verification
//! - Client IP and bearer token extraction
//! - Rate limiting infrastructure

pub mod client;
pub mod crypto;
pub mod jwt;
pub mod password;
pub mod rate_limit;
