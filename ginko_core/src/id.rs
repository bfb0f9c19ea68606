use std::fmt::Debug;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use nanoid::nanoid;

use crate::config::DEFAULT_ID_LENGTH;

/// Characters used for generated ids. Lowercase and digits only so ids are
/// safe in URLs and HTML attributes.
const ALPHABET: [char; 36] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
	'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Produces ids for generated records such as FAQ items.
///
/// Implementations are shared across threads, so interior state must be
/// synchronized.
pub trait IdSource: Debug + Send + Sync {
	fn next_id(&self) -> String;
}

/// Random short ids.
#[derive(Debug, Clone, Copy)]
pub struct NanoIdSource {
	length: usize,
}

impl NanoIdSource {
	pub fn new(length: usize) -> Self {
		Self {
			length: length.max(1),
		}
	}
}

impl Default for NanoIdSource {
	fn default() -> Self {
		Self::new(DEFAULT_ID_LENGTH)
	}
}

impl IdSource for NanoIdSource {
	fn next_id(&self) -> String {
		let length = self.length;
		nanoid!(length, &ALPHABET)
	}
}

/// Deterministic ids `prefix-1`, `prefix-2`, ... for tests and reproducible
/// builds.
#[derive(Debug)]
pub struct SequentialIdSource {
	prefix: String,
	counter: AtomicUsize,
}

impl SequentialIdSource {
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			counter: AtomicUsize::new(0),
		}
	}
}

impl IdSource for SequentialIdSource {
	fn next_id(&self) -> String {
		let next = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
		format!("{}-{next}", self.prefix)
	}
}
