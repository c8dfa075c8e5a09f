//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure becomes an `invalid_request` error whose
//! `details` object names the offending field and a stable code, plus the
//! rejected value where echoing it is safe.

use actix_web::error::JsonPayloadError;
use serde_json::json;

use crate::domain::{AssetId, AssetValidationError, Error, LoginValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidAssetId,
    InvalidJson,
    EmptyUsername,
    EmptyPassword,
    PasswordTooLong,
    EmptyName,
    InvalidPrice,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidAssetId => "invalid_asset_id",
            ErrorCode::InvalidJson => "invalid_json",
            ErrorCode::EmptyUsername => "empty_username",
            ErrorCode::EmptyPassword => "empty_password",
            ErrorCode::PasswordTooLong => "password_too_long",
            ErrorCode::EmptyName => "empty_name",
            ErrorCode::InvalidPrice => "invalid_price",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

pub(crate) const ASSET_ID: FieldName = FieldName::new("id");
const USERNAME: FieldName = FieldName::new("username");
const PASSWORD: FieldName = FieldName::new("password");
const NAME: FieldName = FieldName::new("name");
const PRICE: FieldName = FieldName::new("price");

/// Builder for validation errors with field context.
struct ValidationError {
    field: FieldName,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field.as_str(),
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field.as_str(),
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

/// Parse a path segment into a positive asset id.
pub(crate) fn parse_asset_id(raw: &str, field: FieldName) -> Result<AssetId, Error> {
    raw.parse::<i64>()
        .ok()
        .and_then(|id| AssetId::new(id).ok())
        .ok_or_else(|| {
            ValidationError::new(field, format!("{} must be a positive integer", field.as_str()))
                .with_value(ErrorCode::InvalidAssetId, raw)
        })
}

/// Report a JSON body that could not be read or deserialised.
pub(crate) fn invalid_json_error(err: &JsonPayloadError) -> Error {
    Error::invalid_request(format!("invalid JSON body: {err}"))
        .with_details(json!({ "code": ErrorCode::InvalidJson.as_str() }))
}

pub(crate) fn map_login_validation_error(err: LoginValidationError) -> Error {
    let message = err.to_string();
    match err {
        LoginValidationError::EmptyUsername => {
            ValidationError::new(USERNAME, message).with_code(ErrorCode::EmptyUsername)
        }
        LoginValidationError::EmptyPassword => {
            ValidationError::new(PASSWORD, message).with_code(ErrorCode::EmptyPassword)
        }
        LoginValidationError::PasswordTooLong { .. } => {
            ValidationError::new(PASSWORD, message).with_code(ErrorCode::PasswordTooLong)
        }
    }
}

pub(crate) fn map_asset_validation_error(err: AssetValidationError) -> Error {
    let message = err.to_string();
    match err {
        AssetValidationError::EmptyName => {
            ValidationError::new(NAME, message).with_code(ErrorCode::EmptyName)
        }
        AssetValidationError::NegativePrice | AssetValidationError::NonFinitePrice => {
            ValidationError::new(PRICE, message).with_code(ErrorCode::InvalidPrice)
        }
        AssetValidationError::NonPositiveId => {
            ValidationError::new(ASSET_ID, message).with_code(ErrorCode::InvalidAssetId)
        }
    }
}
