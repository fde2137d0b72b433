//! Diesel schema definitions.

diesel::table! {
    devices (id) {
        id -> Integer,
        platform -> Text,
        name -> Nullable<Text>,
        active -> Bool,
        owner -> Nullable<Text>,
        device_id -> Nullable<Text>,
        registration_id -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}
