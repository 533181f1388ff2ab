//! Acred Node — Hosts a credential ledger for an embedding service:
//! TOML configuration, tracing setup, RocksDB persistence, and a
//! lock-serialized handle safe to share between threads.

pub mod config;
pub mod node;
pub mod storage;
pub mod telemetry;

pub use config::NodeConfig;
pub use node::CredentialNode;
pub use storage::RocksStorage;
