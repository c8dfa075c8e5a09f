//! Marketplace asset records.
//!
//! An asset always has exactly one owner. Ownership changes only through the
//! purchase flow in [`crate::domain::AssetService`]; deletion is restricted to
//! the current owner.

use std::fmt;

use thiserror::Error;

use super::UserId;

/// Validation failures for asset values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetValidationError {
    /// Asset identifiers are generated by the store and always positive.
    #[error("asset id must be positive")]
    NonPositiveId,
    /// Asset names must contain at least one visible character.
    #[error("asset name must not be empty")]
    EmptyName,
    /// Prices cannot be negative.
    #[error("price must not be negative")]
    NegativePrice,
    /// Prices must be finite numbers.
    #[error("price must be a finite number")]
    NonFinitePrice,
}

/// Store-assigned asset identifier.
///
/// # Examples
/// ```
/// use marketplace::domain::AssetId;
///
/// let id = AssetId::new(7).expect("positive id");
/// assert_eq!(id.get(), 7);
/// assert!(AssetId::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(i64);

impl AssetId {
    /// Validate a raw identifier.
    pub fn new(raw: i64) -> Result<Self, AssetValidationError> {
        if raw <= 0 {
            return Err(AssetValidationError::NonPositiveId);
        }
        Ok(Self(raw))
    }

    /// Raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Non-negative, finite asking price.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Price(f64);

impl Price {
    /// Validate a raw price.
    ///
    /// # Examples
    /// ```
    /// use marketplace::domain::Price;
    ///
    /// assert!(Price::new(100.0).is_ok());
    /// assert!(Price::new(-1.0).is_err());
    /// assert!(Price::new(f64::NAN).is_err());
    /// ```
    pub fn new(raw: f64) -> Result<Self, AssetValidationError> {
        if !raw.is_finite() {
            return Err(AssetValidationError::NonFinitePrice);
        }
        if raw < 0.0 {
            return Err(AssetValidationError::NegativePrice);
        }
        Ok(Self(raw))
    }

    /// Raw floating point value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

/// A persisted asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub id: AssetId,
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub price: Price,
}

impl Asset {
    /// Whether `user_id` currently owns this asset.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}

/// Validated input for creating an asset.
///
/// ## Invariants
/// - `name` is trimmed and non-empty.
/// - `description` may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    owner_id: UserId,
    name: String,
    description: String,
    price: Price,
}

impl NewAsset {
    /// Build a creation request owned by `owner_id`.
    ///
    /// # Examples
    /// ```
    /// use marketplace::domain::{NewAsset, Price, UserId};
    ///
    /// let owner = UserId::new(1).expect("valid user id");
    /// let price = Price::new(100.0).expect("valid price");
    /// let asset = NewAsset::new(owner, "  Lamp ", "brass", price).expect("valid asset");
    /// assert_eq!(asset.name(), "Lamp");
    /// ```
    pub fn new(
        owner_id: UserId,
        name: &str,
        description: &str,
        price: Price,
    ) -> Result<Self, AssetValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AssetValidationError::EmptyName);
        }
        Ok(Self {
            owner_id,
            name: name.to_owned(),
            description: description.to_owned(),
            price,
        })
    }

    /// Creator and initial owner.
    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Asking price.
    #[must_use]
    pub fn price(&self) -> Price {
        self.price
    }

    /// Materialise the persisted record once the store assigned an id.
    #[must_use]
    pub fn into_asset(self, id: AssetId) -> Asset {
        Asset {
            id,
            owner_id: self.owner_id,
            name: self.name,
            description: self.description,
            price: self.price,
        }
    }
}
