pub mod catalog;
pub mod server;

pub use catalog::CatalogConfig;
pub use server::{ServerConfig, TlsPaths};
