//! Durable storage for the tracker document.

pub mod error;
pub mod lockfile;
pub mod seed;
pub mod store;

pub use error::StoreError;
pub use seed::Seed;
pub use store::StateStore;
