use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rentledger_core::{AccountId, Entity, LedgerError, LedgerResult, PropertyId};

/// A listed rentable unit.
///
/// Properties are never destroyed. The only mutable field is `active`, and
/// only the owner may flip it (one-way: re-activation is not supported).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    id: PropertyId,
    owner: AccountId,
    name: String,
    description: String,
    /// Price in smallest currency unit per night. Zero is permitted.
    price_per_night: u64,
    active: bool,
}

impl Property {
    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price_per_night(&self) -> u64 {
        self.price_per_night
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Fails with `NotOwner` unless `caller` is the lister of this property.
    pub fn ensure_owner(&self, caller: AccountId) -> LedgerResult<()> {
        if self.owner != caller {
            return Err(LedgerError::NotOwner {
                property_id: self.id,
                caller,
            });
        }
        Ok(())
    }

    /// Fails with `PropertyNotActive` if the property no longer accepts
    /// bookings. Existing bookings are unaffected by deactivation.
    pub fn ensure_active(&self) -> LedgerResult<()> {
        if !self.active {
            return Err(LedgerError::PropertyNotActive {
                property_id: self.id,
            });
        }
        Ok(())
    }
}

impl Entity for Property {
    type Id = PropertyId;

    fn id(&self) -> &PropertyId {
        &self.id
    }
}

/// Registry of listed properties.
///
/// Owns the property id counter: ids are dense, start at 1, and are only
/// allocated under the registry's own mutation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRegistry {
    properties: BTreeMap<PropertyId, Property>,
    next_id: u64,
}

impl Default for PropertyRegistry {
    fn default() -> Self {
        Self {
            properties: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// List a new property for rent. Returns the freshly assigned id.
    ///
    /// The property starts out active. There is nothing to validate here: a
    /// `u64` price admits no malformed value and a price of zero is allowed.
    pub fn list(
        &mut self,
        owner: AccountId,
        name: impl Into<String>,
        description: impl Into<String>,
        price_per_night: u64,
    ) -> PropertyId {
        let id = PropertyId::new(self.next_id);
        self.next_id += 1;

        self.properties.insert(
            id,
            Property {
                id,
                owner,
                name: name.into(),
                description: description.into(),
                price_per_night,
                active: true,
            },
        );

        id
    }

    /// Stop accepting new bookings for a property. Owner-only.
    ///
    /// Idempotent: deactivating an already inactive property is a
    /// successful no-op, so concurrent or retried calls commute.
    pub fn deactivate(&mut self, caller: AccountId, property_id: PropertyId) -> LedgerResult<()> {
        let property = self
            .properties
            .get_mut(&property_id)
            .ok_or(LedgerError::PropertyNotFound { property_id })?;

        if property.owner != caller {
            return Err(LedgerError::NotOwner {
                property_id,
                caller,
            });
        }

        property.active = false;
        Ok(())
    }

    pub fn get(&self, property_id: PropertyId) -> LedgerResult<&Property> {
        self.properties
            .get(&property_id)
            .ok_or(LedgerError::PropertyNotFound { property_id })
    }

    /// Number of properties ever listed.
    pub fn count(&self) -> u64 {
        self.properties.len() as u64
    }
}
