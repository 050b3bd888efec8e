/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::{
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
	time::{Instant, Duration},
};

/// A clock for time-bounded caches. Times are offsets from an arbitrary
/// origin which must not move backwards.
pub trait Timer {
	fn now(&self) -> Duration;
}

impl<F> Timer for F
where
	F: Fn() -> Duration,
{
	fn now(&self) -> Duration {
		self()
	}
}

/// Monotonic time elapsed since the timer was created.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicTimer {
	origin: Instant,
}

impl Default for MonotonicTimer {
	fn default() -> Self {
		MonotonicTimer {
			origin: Instant::now(),
		}
	}
}

impl Timer for MonotonicTimer {
	fn now(&self) -> Duration {
		self.origin.elapsed()
	}
}

/// A clock which only moves when told to. Clones share the same time.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use xcache::{ManualTimer, Timer};
///
/// let timer = ManualTimer::default();
/// let handle = timer.clone();
///
/// handle.advance(Duration::from_millis(900));
/// assert_eq!(timer.now(), Duration::from_millis(900));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualTimer {
	nanos: Arc<AtomicU64>,
}

impl ManualTimer {
	pub fn set(&self, now: Duration) {
		self.nanos.store(to_nanos(now), Ordering::Relaxed);
	}

	pub fn advance(&self, delta: Duration) {
		self.nanos.fetch_add(to_nanos(delta), Ordering::Relaxed);
	}
}

impl Timer for ManualTimer {
	fn now(&self) -> Duration {
		Duration::from_nanos(self.nanos.load(Ordering::Relaxed))
	}
}

fn to_nanos(duration: Duration) -> u64 {
	u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
	use std::time::Duration;
	use crate::timer::{Timer, ManualTimer, MonotonicTimer};

	#[test]
	fn monotonic_timer_does_not_go_backwards() {
		let timer = MonotonicTimer::default();

		let first = timer.now();
		let second = timer.now();

		assert!(second >= first);
	}

	#[test]
	fn manual_timer_is_shared_between_clones() {
		let timer = ManualTimer::default();
		let handle = timer.clone();

		handle.set(Duration::from_secs(5));
		handle.advance(Duration::from_millis(250));

		assert_eq!(timer.now(), Duration::from_millis(5250));
	}

	#[test]
	fn closures_are_timers() {
		let timer = || Duration::from_secs(3);
		assert_eq!(timer.now(), Duration::from_secs(3));
	}
}
