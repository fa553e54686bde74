//! Type identifiers and explicit hierarchy descriptors.
//!
//! The registry never introspects runtime types. Every adaptable instance
//! hands out a [`TypeInfo`] that names its concrete type and links to the
//! descriptors of its declared interfaces and its superclass. Descriptors are
//! assembled bottom-up from already-built parents, so a hierarchy cannot
//! contain cycles.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

macro_rules! type_name_newtype {
	($(#[$attr:meta])* $name:ident) => {
		$(#[$attr])*
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
		pub struct $name(Arc<str>);

		impl $name {
			/// Creates an identifier from a fully-qualified type name.
			pub fn new(name: impl AsRef<str>) -> Self {
				Self(Arc::from(name.as_ref()))
			}

			/// Returns the fully-qualified type name.
			#[inline]
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}

		impl fmt::Debug for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}({:?})", stringify!($name), &*self.0)
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<&str> for $name {
			fn from(name: &str) -> Self {
				Self::new(name)
			}
		}

		impl From<String> for $name {
			fn from(name: String) -> Self {
				Self(Arc::from(name))
			}
		}

		impl std::borrow::Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
	};
}

type_name_newtype!(
	/// Identifier of a type that can be adapted.
	SourceType
);

type_name_newtype!(
	/// Identifier of a capability that can be requested.
	TargetType
);

impl TargetType {
	/// Returns the identifier naming the Rust type `T`.
	///
	/// Typed lookups through [`crate::Registry::adapt`] use this name, so
	/// providers that want to serve them must declare the same string.
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self::new(std::any::type_name::<T>())
	}
}

/// Hierarchy descriptor for one source type.
#[derive(Debug)]
pub struct TypeInfo {
	name: SourceType,
	interfaces: Vec<Arc<TypeInfo>>,
	superclass: Option<Arc<TypeInfo>>,
}

impl TypeInfo {
	/// Starts a descriptor with no declared parents.
	pub fn root(name: impl Into<SourceType>) -> Self {
		Self {
			name: name.into(),
			interfaces: Vec::new(),
			superclass: None,
		}
	}

	/// Appends a declared interface. Declaration order is resolution order.
	pub fn implements(mut self, iface: &Arc<TypeInfo>) -> Self {
		self.interfaces.push(Arc::clone(iface));
		self
	}

	/// Sets the superclass, replacing any previous one.
	pub fn extends(mut self, parent: &Arc<TypeInfo>) -> Self {
		self.superclass = Some(Arc::clone(parent));
		self
	}

	/// Finishes the descriptor.
	pub fn build(self) -> Arc<TypeInfo> {
		Arc::new(self)
	}

	#[inline]
	pub fn name(&self) -> &SourceType {
		&self.name
	}

	#[inline]
	pub fn interfaces(&self) -> &[Arc<TypeInfo>] {
		&self.interfaces
	}

	#[inline]
	pub fn superclass(&self) -> Option<&Arc<TypeInfo>> {
		self.superclass.as_ref()
	}

	/// Returns true if `name` is this type or any of its ancestors.
	pub fn is_a(&self, name: &str) -> bool {
		self.name.as_str() == name
			|| self.interfaces.iter().any(|i| i.is_a(name))
			|| self.superclass.as_ref().is_some_and(|s| s.is_a(name))
	}
}

/// An instance that can be handed to [`crate::Registry::resolve`].
pub trait Adaptable: Any {
	/// Descriptor of the instance's concrete type.
	fn type_info(&self) -> &Arc<TypeInfo>;

	/// Upcast used by providers to reach the concrete instance.
	fn as_any(&self) -> &dyn Any;
}
