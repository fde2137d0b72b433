//! Database models.

use diesel::prelude::*;

use crate::schema::devices;

/// Device record.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = devices)]
pub struct DeviceRow {
    pub id: i32,
    pub platform: String,
    pub name: Option<String>,
    pub active: bool,
    pub owner: Option<String>,
    pub device_id: Option<String>,
    pub registration_id: String,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

/// New device for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = devices)]
pub struct NewDeviceRow<'a> {
    pub platform: &'a str,
    pub name: Option<&'a str>,
    pub active: bool,
    pub owner: Option<&'a str>,
    pub device_id: Option<&'a str>,
    pub registration_id: &'a str,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}
