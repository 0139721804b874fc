//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation and type-safe SQL generation. Regenerate
//! with `diesel print-schema` after changing migrations.

diesel::table! {
    /// User accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// Salted one-way credential hash.
        password_hash -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Match catalogue. Capacity and price are immutable once seeded.
    matches (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Home side name.
        home_team -> Varchar,
        /// Away side name.
        away_team -> Varchar,
        /// Kick-off instant.
        kickoff -> Timestamptz,
        /// Stadium name.
        stadium -> Varchar,
        /// Total seats available for sale.
        capacity -> Int4,
        /// Ticket price in pence.
        price_pence -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Cart contents, unique per user+match.
    cart_items (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Match the user intends to buy a ticket for.
        match_id -> Uuid,
        /// Instant the item entered the cart.
        added_at -> Timestamptz,
    }
}

diesel::table! {
    /// Completed purchases. Status is PAID or CANCELLED.
    bookings (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Purchasing user.
        user_id -> Uuid,
        /// Booked match.
        match_id -> Uuid,
        /// Purchase instant.
        booked_at -> Timestamptz,
        /// Lifecycle status string.
        status -> Varchar,
    }
}

diesel::joinable!(cart_items -> users (user_id));
diesel::joinable!(cart_items -> matches (match_id));
diesel::joinable!(bookings -> users (user_id));
diesel::joinable!(bookings -> matches (match_id));

diesel::allow_tables_to_appear_in_same_query!(users, matches, cart_items, bookings);
