//! Storage and remote layer abstraction trait definition

mod archive_registry;
mod local_store;
mod remote_config_repository;

pub use archive_registry::{ArchiveFactory, ArchiveRegistry, InMemoryArchiveRegistry};
pub use local_store::{LocalStore, StoreTransaction};
pub use remote_config_repository::RemoteConfigRepository;
