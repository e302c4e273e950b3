//! Dependency linking.
//!
//! The linker orders discovered modules so that every requirement of a
//! module is satisfied by a module placed before it.
//!
//! Modules are first stable-sorted by interface name (case-insensitive), so
//! all versions of one interface are tried next to each other and tend to
//! become visible to their dependents together. Linking then proceeds in
//! rounds over the modules not linked yet:
//!
//! - a module whose interface and version is already linked is a duplicate
//!   and fails the link;
//! - a module links if every requirement is matched by some linked version,
//!   including versions linked earlier in the same round;
//! - everything else is deferred to the next round.
//!
//! A round that links nothing is a deadlock and fails with every stuck
//! module, so linking never takes more rounds than there are modules.

use crate::descriptor::{ModuleDescriptor, Requirement};
use crate::error::{RuntimeError, RuntimeResult};
use nodejs_semver::Version;
use std::collections::HashMap;
use tracing::debug;

/// Modules in an order where every requirement is met by an earlier module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedSequence {
    modules: Vec<ModuleDescriptor>,
}

impl LinkedSequence {
    /// The linked modules in load order.
    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    /// Iterate over the modules in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, ModuleDescriptor> {
        self.modules.iter()
    }

    /// Number of linked modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if nothing was linked.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Wrap modules that were never checked by the linker.
    #[cfg(test)]
    pub(crate) fn from_unchecked(modules: Vec<ModuleDescriptor>) -> Self {
        Self { modules }
    }

    /// Take the modules out of the sequence.
    pub fn into_modules(self) -> Vec<ModuleDescriptor> {
        self.modules
    }
}

impl IntoIterator for LinkedSequence {
    type Item = ModuleDescriptor;
    type IntoIter = std::vec::IntoIter<ModuleDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.into_iter()
    }
}

impl<'a> IntoIterator for &'a LinkedSequence {
    type Item = &'a ModuleDescriptor;
    type IntoIter = std::slice::Iter<'a, ModuleDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter()
    }
}

/// Versions linked so far, per interface. Only records presence.
#[derive(Debug, Default)]
struct LinkedCache {
    versions: HashMap<String, Vec<Version>>,
}

impl LinkedCache {
    fn contains(&self, module: &ModuleDescriptor) -> bool {
        self.versions
            .get(&module.interface)
            .is_some_and(|versions| versions.contains(&module.version))
    }

    fn satisfies(&self, requirement: &Requirement) -> bool {
        self.versions
            .get(&requirement.interface)
            .is_some_and(|versions| versions.iter().any(|v| requirement.matches(v)))
    }

    fn insert(&mut self, module: &ModuleDescriptor) {
        self.versions
            .entry(module.interface.clone())
            .or_default()
            .push(module.version.clone());
    }
}

/// Compute the load order for the given modules.
pub fn link(modules: Vec<ModuleDescriptor>) -> RuntimeResult<LinkedSequence> {
    debug!("Starting linker for {} modules", modules.len());

    let mut pending = modules;
    pending.sort_by_cached_key(|module| module.interface.to_uppercase());

    let mut cache = LinkedCache::default();
    let mut linked = Vec::with_capacity(pending.len());
    let mut round = 0usize;

    while !pending.is_empty() {
        round += 1;
        let before = linked.len();
        let mut deferred = Vec::new();

        for module in pending {
            if cache.contains(&module) {
                return Err(RuntimeError::DuplicateRegistration(module.id()));
            }

            if module.requires.iter().all(|req| cache.satisfies(req)) {
                debug!("Found linkable module {} in round {}", module, round);
                cache.insert(&module);
                linked.push(module);
            } else {
                deferred.push(module);
            }
        }

        if linked.len() == before {
            let stuck = deferred.iter().map(ModuleDescriptor::id).collect();
            return Err(RuntimeError::UnsatisfiableDependency(stuck));
        }

        pending = deferred;
    }

    debug!("Linked {} modules in {} rounds", linked.len(), round);
    Ok(LinkedSequence { modules: linked })
}
