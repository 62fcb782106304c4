//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Credential hashing and verification (Argon2id, PHC strings)
//! - Zeroized plaintext handling for password material

pub mod password;
