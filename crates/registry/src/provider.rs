use std::any::Any;
use std::fmt;

use crate::error::ProviderFault;
use crate::types::{Adaptable, TargetType};

/// The value a provider produces for a requested target.
pub type Capability = Box<dyn Any + Send>;

/// A capability factory.
///
/// The registry only decides *which* provider answers a
/// `(source type, target type)` pair. What the provider returns, including
/// `Ok(None)` to decline a particular instance, is passed through as-is.
pub trait Provider: Send + Sync {
	/// Produces `target` for `instance`, or declines with `Ok(None)`.
	fn resolve(
		&self,
		instance: &dyn Adaptable,
		target: &TargetType,
	) -> Result<Option<Capability>, ProviderFault>;

	/// Display name used in logs.
	fn name(&self) -> &str {
		std::any::type_name::<Self>()
	}
}

type ResolveFn =
	dyn Fn(&dyn Adaptable, &TargetType) -> Result<Option<Capability>, ProviderFault> + Send + Sync;

/// Closure-backed [`Provider`].
pub struct FnProvider {
	name: String,
	f: Box<ResolveFn>,
}

impl FnProvider {
	pub fn new<F>(name: impl Into<String>, f: F) -> Self
	where
		F: Fn(&dyn Adaptable, &TargetType) -> Result<Option<Capability>, ProviderFault>
			+ Send
			+ Sync
			+ 'static,
	{
		Self {
			name: name.into(),
			f: Box::new(f),
		}
	}
}

impl Provider for FnProvider {
	fn resolve(
		&self,
		instance: &dyn Adaptable,
		target: &TargetType,
	) -> Result<Option<Capability>, ProviderFault> {
		(self.f)(instance, target)
	}

	fn name(&self) -> &str {
		&self.name
	}
}

impl fmt::Debug for FnProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FnProvider").field("name", &self.name).finish()
	}
}
