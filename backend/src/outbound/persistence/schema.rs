//! Diesel table definitions for the parking schema.
//!
//! These definitions must match the migrations in `backend/migrations`. The
//! staging table has no primary key and is only reached through raw SQL, so
//! it is not declared here.

diesel::table! {
    /// Destination buildings.
    buildings (building_id) {
        building_id -> Int4,
        name -> Text,
        latitude -> Float8,
        longitude -> Float8,
    }
}

diesel::table! {
    /// Parking lots. Coordinates are optional.
    lots (lot_id) {
        lot_id -> Int4,
        title -> Text,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
    }
}

diesel::table! {
    /// Permit categories.
    permits (permit_id) {
        permit_id -> Int4,
        name -> Text,
    }
}

diesel::table! {
    /// Lot to permit association.
    lot_permit (lot_id, permit_id) {
        lot_id -> Int4,
        permit_id -> Int4,
    }
}

diesel::table! {
    /// Walking distance in seconds from a lot to a building.
    lot_building_distance (lot_id, building_id) {
        lot_id -> Int4,
        building_id -> Int4,
        distance -> Int4,
    }
}

diesel::table! {
    /// Timestamped capacity readings.
    lot_inventory (lot_id, snapshot_ts) {
        lot_id -> Int4,
        snapshot_ts -> Timestamp,
        capacity_total -> Int4,
    }
}

diesel::joinable!(lot_permit -> lots (lot_id));
diesel::joinable!(lot_permit -> permits (permit_id));
diesel::joinable!(lot_building_distance -> lots (lot_id));
diesel::joinable!(lot_building_distance -> buildings (building_id));
diesel::joinable!(lot_inventory -> lots (lot_id));

diesel::allow_tables_to_appear_in_same_query!(
    buildings,
    lots,
    permits,
    lot_permit,
    lot_building_distance,
    lot_inventory,
);
