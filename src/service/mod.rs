pub mod bid_service;
pub mod error;
pub mod feed;
pub mod identity;
pub mod session_verifier;
