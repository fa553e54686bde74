use std::sync::atomic::{AtomicBool, Ordering};

/// Tells the host whether the surrounding system is ready for registrations.
pub trait LifecycleGate: Send + Sync {
	fn is_ready(&self) -> bool;
}

/// Gate flipped explicitly by the owner.
#[derive(Debug, Default)]
pub struct ManualGate {
	ready: AtomicBool,
}

impl ManualGate {
	pub fn new(ready: bool) -> Self {
		Self {
			ready: AtomicBool::new(ready),
		}
	}

	pub fn open(&self) {
		self.ready.store(true, Ordering::Release);
	}

	pub fn close(&self) {
		self.ready.store(false, Ordering::Release);
	}
}

impl LifecycleGate for ManualGate {
	fn is_ready(&self) -> bool {
		self.ready.load(Ordering::Acquire)
	}
}
