//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use diesel::prelude::*;

use crate::domain::ports::{AssetRepositoryError, UserAccount, UserPersistenceError};
use crate::domain::{Asset, AssetId, NewAsset, PasswordHash, Price, User, UserId, Username};

use super::schema::{assets, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = UserPersistenceError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = UserId::new(row.id).map_err(|err| UserPersistenceError::query(err.to_string()))?;
        let username = Username::new(&row.username)
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        Ok(Self {
            user: User::new(id, username),
            password_hash: PasswordHash::new(row.password_hash),
        })
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
}

/// Row struct for reading from the assets table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = assets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AssetRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl TryFrom<AssetRow> for Asset {
    type Error = AssetRepositoryError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        let corrupt = |err: &dyn std::fmt::Display| {
            AssetRepositoryError::query(format!("invalid asset row {}: {err}", row.id))
        };
        Ok(Self {
            id: AssetId::new(row.id).map_err(|err| corrupt(&err))?,
            owner_id: UserId::new(row.user_id).map_err(|err| corrupt(&err))?,
            price: Price::new(row.price).map_err(|err| corrupt(&err))?,
            name: row.name,
            description: row.description,
        })
    }
}

/// Insertable struct for creating new asset records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = assets)]
pub(crate) struct NewAssetRow<'a> {
    pub user_id: i64,
    pub name: &'a str,
    pub description: &'a str,
    pub price: f64,
}

impl<'a> From<&'a NewAsset> for NewAssetRow<'a> {
    fn from(asset: &'a NewAsset) -> Self {
        Self {
            user_id: asset.owner_id().get(),
            name: asset.name(),
            description: asset.description(),
            price: asset.price().get(),
        }
    }
}
