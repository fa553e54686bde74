//! Fixtures shared by unit tests.

use std::any::Any;
use std::sync::Arc;

use crate::{Adaptable, Capability, FnProvider, ProviderFault, Registration, TargetType, TypeInfo};

/// Instance whose concrete type is described by `info`.
pub(crate) struct Obj {
	pub info: Arc<TypeInfo>,
	pub tag: &'static str,
}

impl Obj {
	pub fn new(info: &Arc<TypeInfo>) -> Self {
		Self {
			info: Arc::clone(info),
			tag: "",
		}
	}

	pub fn tagged(info: &Arc<TypeInfo>, tag: &'static str) -> Self {
		Self {
			info: Arc::clone(info),
			tag,
		}
	}
}

impl Adaptable for Obj {
	fn type_info(&self) -> &Arc<TypeInfo> {
		&self.info
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// Provider answering every request with its own name.
pub(crate) fn named(name: &'static str) -> Registration {
	Registration::new(FnProvider::new(name, move |_, _| {
		Ok(Some(Box::new(name) as Capability))
	}))
}

/// Provider answering with its name unless the instance carries `refused`.
pub(crate) fn picky(name: &'static str, refused: &'static str) -> Registration {
	Registration::new(FnProvider::new(name, move |instance, _| {
		let obj = instance.as_any().downcast_ref::<Obj>();
		if obj.is_some_and(|o| o.tag == refused) {
			return Ok(None);
		}
		Ok(Some(Box::new(name) as Capability))
	}))
}

/// Provider that always fails.
pub(crate) fn faulty(name: &'static str) -> Registration {
	Registration::new(FnProvider::new(name, move |_, target: &TargetType| {
		Err(ProviderFault::new(format!("{name} cannot produce {target}")))
	}))
}

/// Extracts the provider name from a capability produced by [`named`].
pub(crate) fn who(cap: Option<Capability>) -> Option<&'static str> {
	cap.and_then(|c| c.downcast::<&'static str>().ok()).map(|b| *b)
}

/// Sink remembering every event, optionally failing each call.
#[derive(Default)]
pub(crate) struct RecordingSink {
	pub events: parking_lot::Mutex<Vec<crate::ProviderEvent>>,
	pub fail: bool,
}

impl RecordingSink {
	pub fn kinds(&self) -> Vec<(crate::ProviderEventKind, u64)> {
		self.events
			.lock()
			.iter()
			.map(|e| (e.kind, e.key.as_u64()))
			.collect()
	}
}

impl crate::EventSink for RecordingSink {
	fn on_provider_added(&self, event: &crate::ProviderEvent) -> Result<(), crate::SinkError> {
		self.events.lock().push(event.clone());
		if self.fail {
			return Err(crate::SinkError("offline".into()));
		}
		Ok(())
	}

	fn on_provider_removed(&self, event: &crate::ProviderEvent) -> Result<(), crate::SinkError> {
		self.on_provider_added(event)
	}
}

/// Publisher tracking which markers are currently live.
#[derive(Default)]
pub(crate) struct RecordingPublisher {
	live: parking_lot::Mutex<rustc_hash::FxHashMap<u64, (String, String)>>,
	next: std::sync::atomic::AtomicU64,
}

impl RecordingPublisher {
	/// Live markers as sorted `(source, target)` pairs.
	pub fn live(&self) -> Vec<(String, String)> {
		let mut pairs: Vec<_> = self.live.lock().values().cloned().collect();
		pairs.sort();
		pairs
	}
}

impl crate::AvailabilityPublisher for RecordingPublisher {
	fn publish(&self, source: &crate::SourceType, target: &TargetType) -> crate::MarkerHandle {
		let id = self
			.next
			.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
		self.live
			.lock()
			.insert(id, (source.to_string(), target.to_string()));
		crate::MarkerHandle::new(id)
	}

	fn withdraw(&self, handle: crate::MarkerHandle) {
		self.live.lock().remove(&handle.id());
	}
}
