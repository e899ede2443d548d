use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};

use rand::Rng;
use rand::seq::SliceRandom;

/// Sorted, deduplicated addresses the target hostname resolved to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSet(Vec<IpAddr>);

impl AddressSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &IpAddr> {
        self.0.iter()
    }

    /// Picks a dial address uniformly at random.
    #[must_use]
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<IpAddr> {
        self.0.choose(rng).copied()
    }
}

impl FromIterator<IpAddr> for AddressSet {
    fn from_iter<I: IntoIterator<Item = IpAddr>>(iter: I) -> Self {
        let unique: BTreeSet<IpAddr> = iter.into_iter().collect();
        Self(unique.into_iter().collect())
    }
}

impl fmt::Display for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for addr in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}", addr)?;
            first = false;
        }
        Ok(())
    }
}

/// The run's current address set. One writer (the resolver), many readers.
///
/// Readers always get their own copy; the lock is never held across I/O.
#[derive(Debug, Default)]
pub struct AddressState {
    current: Mutex<AddressSet>,
}

impl AddressState {
    #[must_use]
    pub fn new(initial: AddressSet) -> Self {
        Self {
            current: Mutex::new(initial),
        }
    }

    /// Swaps in `next`. Returns `true` when the content changed.
    ///
    /// An empty set is ignored so a run that resolved once never loses its
    /// addresses.
    pub fn replace(&self, next: AddressSet) -> bool {
        if next.is_empty() {
            return false;
        }
        let mut guard = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if *guard == next {
            return false;
        }
        *guard = next;
        true
    }

    #[must_use]
    pub fn snapshot(&self) -> AddressSet {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
