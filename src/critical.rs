//! # Critical section
//!
//! A value guarded by a single mutual-exclusion lock.

use parking_lot::{const_mutex, Mutex};
use std::fmt;

/// A value whose every read and write happens inside an exclusive critical region
///
/// The lock is not reentrant: acquiring it again from inside
/// [with_critical_region](Critical::with_critical_region) on the same instance deadlocks.
pub struct Critical<T> {
    lock: Mutex<T>,
}

impl<T> Critical<T> {
    /// Creates a new critical value
    pub const fn new(initial: T) -> Self {
        Self {
            lock: const_mutex(initial),
        }
    }

    /// Runs `body` with exclusive, mutable access to the value and returns its result
    ///
    /// The lock is released on every exit path, unwinding included.
    pub fn with_critical_region<R>(&self, body: impl FnOnce(&mut T) -> R) -> R {
        let mut value = self.lock.lock();
        body(&mut value)
    }

    /// Returns a copy of the value
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with_critical_region(|value| value.clone())
    }

    /// Replaces the value
    pub fn set(&self, value: T) {
        self.with_critical_region(|current| *current = value);
    }

    /// Consumes the critical section and returns the value
    pub fn into_inner(self) -> T {
        self.lock.into_inner()
    }
}

impl<T: Default> Default for Critical<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Critical<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lock.try_lock() {
            Some(value) => f.debug_tuple("Critical").field(&*value).finish(),
            None => f.write_str("Critical(<locked>)"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::{panic, sync::Arc, thread};

    #[test]
    fn get_and_set() {
        let critical = Critical::new(1);
        assert_eq!(critical.get(), 1);
        critical.set(2);
        assert_eq!(critical.get(), 2);
        assert_eq!(critical.into_inner(), 2);
    }

    #[test]
    fn region_returns_body_result() {
        let critical = Critical::new(vec![1, 2]);
        let len = critical.with_critical_region(|values| {
            values.push(3);
            values.len()
        });
        assert_eq!(len, 3);
        assert_eq!(critical.get(), [1, 2, 3]);
    }

    #[test]
    fn lock_released_after_panic() {
        let critical = Arc::new(Critical::new(0));
        let cloned = critical.clone();
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            cloned.with_critical_region(|value| {
                *value = 1;
                panic!("inside critical region");
            })
        }));
        assert!(result.is_err());
        assert_eq!(critical.get(), 1);
    }

    #[test]
    fn concurrent_increments() {
        let critical = Arc::new(Critical::new(0u32));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let critical = critical.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        critical.with_critical_region(|value| *value += 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(critical.get(), 8000);
    }
}
