//! Runtime capability-provider registry.
//!
//! Providers declare which source types they can convert into which target
//! capabilities. Client code asks the [`Registry`] for a capability of a
//! given instance; the registry picks the single responsible provider for the
//! instance's concrete type, taking the declared type hierarchy into account.
//!
//! - [`TypeInfo`]: explicit hierarchy descriptor for a source type
//! - [`Provider`]: capability factory invoked on a successful lookup
//! - [`Registration`]: one provider bound under one or more source types
//! - [`Registry`]: the concurrent facade owning table and resolution cache
//! - [`EventSink`] / [`AvailabilityPublisher`]: collaborators notified on change

pub mod cache;
pub mod collab;
pub mod config;
pub mod error;
pub mod provider;
pub mod registration;
pub mod registry;
pub mod resolver;
pub mod table;
pub mod types;

pub use cache::{EffectiveMap, ResolutionCache};
pub use collab::{
	AvailabilityPublisher, EventSink, MarkerHandle, NoopPublisher, NoopSink, ProviderEvent,
	ProviderEventKind,
};
pub use config::RegistryConfig;
pub use error::{ProviderFault, RegisterError, SinkError};
pub use provider::{Capability, FnProvider, Provider};
pub use registration::{Priority, Registration, RegistrationKey};
pub use registry::{Registry, RegistryStats};
pub use resolver::HierarchyResolver;
pub use table::{ProviderTable, TableEntry};
pub use types::{Adaptable, SourceType, TargetType, TypeInfo};

#[cfg(test)]
pub(crate) mod testing;
