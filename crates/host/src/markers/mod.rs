//! In-memory availability markers.
//!
//! The registry publishes one marker per declared `(source, target)` pair of
//! every registration. [`MarkerBoard`] reference-counts them so a pair stays
//! available while at least one registration declares it, and wakes waiters
//! whenever the set of markers changes.

use std::time::{Duration, Instant};

use adaptor_registry::{AvailabilityPublisher, MarkerHandle, SourceType, TargetType};
use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap as HashMap;


type Pair = (SourceType, TargetType);

#[derive(Default)]
struct BoardState {
	next: u64,
	handles: HashMap<u64, Pair>,
	counts: HashMap<SourceType, HashMap<TargetType, usize>>,
}

impl BoardState {
	fn is_available(&self, source: &SourceType, target: &TargetType) -> bool {
		self.counts
			.get(source)
			.and_then(|targets| targets.get(target))
			.is_some_and(|&n| n > 0)
	}
}

/// Reference-counted availability markers with blocking waits.
#[derive(Default)]
pub struct MarkerBoard {
	state: Mutex<BoardState>,
	changed: Condvar,
}

impl MarkerBoard {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns true while some registration declares `(source, target)`.
	pub fn is_available(&self, source: &SourceType, target: &TargetType) -> bool {
		self.state.lock().is_available(source, target)
	}

	/// Blocks until `(source, target)` becomes available or `timeout` elapses.
	///
	/// Returns whether the pair is available on return.
	pub fn wait_available(
		&self,
		source: &SourceType,
		target: &TargetType,
		timeout: Duration,
	) -> bool {
		let deadline = Instant::now().checked_add(timeout);
		let mut state = self.state.lock();
		loop {
			if state.is_available(source, target) {
				return true;
			}
			match deadline {
				Some(deadline) => {
					if self.changed.wait_until(&mut state, deadline).timed_out() {
						return state.is_available(source, target);
					}
				}
				// Past the representable range: wait without a deadline.
				None => self.changed.wait(&mut state),
			}
		}
	}

	/// Currently available pairs, sorted.
	pub fn available(&self) -> Vec<Pair> {
		let mut pairs: Vec<Pair> = self
			.state
			.lock()
			.counts
			.iter()
			.flat_map(|(source, targets)| {
				targets.keys().map(move |target| (source.clone(), target.clone()))
			})
			.collect();
		pairs.sort();
		pairs
	}

	/// Number of live marker handles.
	pub fn len(&self) -> usize {
		self.state.lock().handles.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl AvailabilityPublisher for MarkerBoard {
	fn publish(&self, source: &SourceType, target: &TargetType) -> MarkerHandle {
		let mut state = self.state.lock();
		let id = state.next;
		state.next += 1;
		*state
			.counts
			.entry(source.clone())
			.or_default()
			.entry(target.clone())
			.or_default() += 1;
		state.handles.insert(id, (source.clone(), target.clone()));
		drop(state);

		self.changed.notify_all();
		MarkerHandle::new(id)
	}

	fn withdraw(&self, handle: MarkerHandle) {
		let mut state = self.state.lock();
		let Some((source, target)) = state.handles.remove(&handle.id()) else {
			return;
		};
		if let Some(targets) = state.counts.get_mut(&source) {
			if let Some(count) = targets.get_mut(&target) {
				*count -= 1;
				if *count == 0 {
					targets.remove(&target);
				}
			}
			if targets.is_empty() {
				state.counts.remove(&source);
			}
		}
		drop(state);

		self.changed.notify_all();
	}
}

impl std::fmt::Debug for MarkerBoard {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MarkerBoard")
			.field("available", &self.available())
			.finish()
	}
}
