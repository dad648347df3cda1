pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod server;
pub mod service;

pub use error::PhonebankError;
pub use identity::{HeaderIdentityProvider, Identity, IdentityProvider};
pub use service::Phonebank;
