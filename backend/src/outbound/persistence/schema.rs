//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. When the
//! migrations change, regenerate with `diesel print-schema` or update by hand.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Int8,
        /// Unique login name (max 64 characters).
        username -> Varchar,
        /// bcrypt hash in modular crypt format.
        password_hash -> Text,
    }
}

diesel::table! {
    /// Marketplace assets. `user_id` is the current owner.
    assets (id) {
        id -> Int8,
        user_id -> Int8,
        name -> Text,
        description -> Text,
        /// Non-negative, enforced by a CHECK constraint.
        price -> Float8,
    }
}

diesel::joinable!(assets -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(assets, users);
