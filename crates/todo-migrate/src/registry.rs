//! The ordered, ordinal-unique collection of change units.

use crate::error::{MigrateError, MigrateResult};
use crate::unit::{ChangeUnit, Ordinal};

/// Collects change units before a [`Registry`] is built.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    units: Vec<ChangeUnit>,
}

impl RegistryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a change unit. Registration order does not matter.
    pub fn register(mut self, unit: ChangeUnit) -> Self {
        self.units.push(unit);
        self
    }

    /// Sort the units by ordinal and check that no ordinal repeats.
    pub fn build(mut self) -> MigrateResult<Registry> {
        self.units.sort_by_key(ChangeUnit::ordinal);

        if let Some(pair) = self
            .units
            .windows(2)
            .find(|pair| pair[0].ordinal() == pair[1].ordinal())
        {
            return Err(MigrateError::DuplicateOrdinal {
                ordinal: pair[0].ordinal(),
                first: pair[0].name().to_string(),
                second: pair[1].name().to_string(),
            });
        }

        Ok(Registry { units: self.units })
    }
}

/// Every known change unit, sorted ascending by ordinal.
///
/// Read-only once built.
#[derive(Debug, Default)]
pub struct Registry {
    units: Vec<ChangeUnit>,
}

impl Registry {
    /// Start collecting units
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// All units in ascending ordinal order
    pub fn all(&self) -> &[ChangeUnit] {
        &self.units
    }

    /// Look up a unit by ordinal
    pub fn get(&self, ordinal: Ordinal) -> Option<&ChangeUnit> {
        self.units
            .binary_search_by_key(&ordinal, ChangeUnit::ordinal)
            .ok()
            .map(|idx| &self.units[idx])
    }

    /// Highest registered ordinal
    pub fn latest(&self) -> Option<Ordinal> {
        self.units.last().map(ChangeUnit::ordinal)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
