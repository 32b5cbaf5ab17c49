//! Run-wide (project code, id) table shared across generation rounds.

use crate::prelude::*;
use std::{
    collections::HashMap,
    sync::{Arc, LazyLock, Mutex, MutexGuard},
};

///
/// IdOwner
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IdOwner {
    pub interface: String,
    pub method: String,
}

impl IdOwner {
    #[must_use]
    pub fn origin(&self) -> Origin {
        Origin::method(self.interface.clone(), self.method.clone())
    }
}

///
/// RangeClaim
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeClaim {
    pub interface: String,
    pub range: IdRange,
}

#[derive(Debug, Default)]
struct RegistryState {
    ids: HashMap<(String, i64), IdOwner>,
    lengths: HashMap<String, (u8, String)>,
    ranges: HashMap<String, Vec<RangeClaim>>,
}

///
/// IdRegistry
/// cloneable handle; clones share one table
///

#[derive(Clone, Debug, Default)]
pub struct IdRegistry {
    state: Arc<Mutex<RegistryState>>,
}

static GLOBAL: LazyLock<IdRegistry> = LazyLock::new(IdRegistry::new);

impl IdRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used when no explicit handle is supplied.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state
            .lock()
            .expect("id registry mutex poisoned while acquiring lock")
    }

    /// Claim an id for a method; a previous claim by a different method name is returned.
    pub fn claim_id(&self, project_code: &str, id: i64, owner: IdOwner) -> Result<(), IdOwner> {
        let mut state = self.lock();
        let key = (project_code.to_string(), id);

        if let Some(existing) = state.ids.get(&key) {
            return if existing.method == owner.method {
                Ok(())
            } else {
                Err(existing.clone())
            };
        }
        state.ids.insert(key, owner);

        Ok(())
    }

    /// Claim an id padding length for a project code; a conflicting claim is returned.
    pub fn claim_length(
        &self,
        project_code: &str,
        length: u8,
        interface: &str,
    ) -> Result<(), (u8, String)> {
        let mut state = self.lock();
        let entry = state
            .lengths
            .entry(project_code.to_string())
            .or_insert_with(|| (length, interface.to_string()));

        if entry.0 == length || entry.1 == interface {
            entry.0 = length;
            Ok(())
        } else {
            Err(entry.clone())
        }
    }

    /// Claim id ranges for a project code; returns overlapping claims of other interfaces.
    pub fn claim_ranges(
        &self,
        project_code: &str,
        ranges: &[IdRange],
        interface: &str,
    ) -> Vec<(IdRange, RangeClaim)> {
        let mut state = self.lock();
        let claims = state.ranges.entry(project_code.to_string()).or_default();

        let overlaps: Vec<(IdRange, RangeClaim)> = ranges
            .iter()
            .flat_map(|range| {
                claims
                    .iter()
                    .filter(|c| c.interface != interface && c.range.overlaps(range))
                    .map(|c| (*range, c.clone()))
            })
            .collect();

        claims.retain(|c| c.interface != interface);
        claims.extend(ranges.iter().map(|range| RangeClaim {
            interface: interface.to_string(),
            range: *range,
        }));

        overlaps
    }

    #[must_use]
    pub fn id_count(&self) -> usize {
        self.lock().ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn owner(interface: &str, method: &str) -> IdOwner {
        IdOwner {
            interface: interface.to_string(),
            method: method.to_string(),
        }
    }

    #[test]
    fn same_name_may_share_an_id() {
        let registry = IdRegistry::new();
        assert!(registry.claim_id("EX", 5, owner("a::Log", "greet")).is_ok());
        assert!(registry.claim_id("EX", 5, owner("b::Log", "greet")).is_ok());

        let existing = registry
            .claim_id("EX", 5, owner("b::Log", "other"))
            .expect_err("different name should conflict");
        assert_eq!(existing, owner("a::Log", "greet"));

        // different project codes never collide
        assert!(registry.claim_id("OT", 5, owner("c::Log", "other")).is_ok());
    }

    #[test]
    fn lengths_must_agree_per_project_code() {
        let registry = IdRegistry::new();
        assert!(registry.claim_length("EX", 6, "a::Log").is_ok());
        assert!(registry.claim_length("EX", 6, "b::Log").is_ok());
        assert_eq!(
            registry.claim_length("EX", 4, "c::Log"),
            Err((6, "a::Log".to_string()))
        );
    }

    #[test]
    fn overlapping_ranges_of_other_interfaces_are_returned() {
        let registry = IdRegistry::new();
        assert!(
            registry
                .claim_ranges("EX", &[IdRange::new(1, 99)], "a::Log")
                .is_empty()
        );
        // re-claiming for the same interface is not an overlap
        assert!(
            registry
                .claim_ranges("EX", &[IdRange::new(1, 99)], "a::Log")
                .is_empty()
        );

        let overlaps = registry.claim_ranges("EX", &[IdRange::new(50, 150)], "b::Log");
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].1.interface, "a::Log");
    }

    #[test]
    fn clones_share_state_across_threads() {
        let registry = IdRegistry::new();
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let registry = registry.clone();
                thread::spawn(move || {
                    registry
                        .claim_id("EX", n, owner("a::Log", &format!("m{n}")))
                        .is_ok()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(registry.id_count(), 4);
    }
}
