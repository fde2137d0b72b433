//! SQLite storage implementation.

use chrono::{DateTime, Utc};
use color_eyre::eyre::WrapErr as _;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;

use crate::models::*;
use crate::schema::devices;
use crate::traits::DeviceStore;
use push_core::{Device, DeviceVariant, NewDevice, Platform};

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// SQLite-based device registry.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage from a database URL.
    pub fn new(database_url: &str) -> color_eyre::eyre::Result<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .wrap_err("failed to create connection pool")?;

        Ok(Self { pool })
    }

    /// Run migrations.
    pub fn run_migrations(&self) -> color_eyre::eyre::Result<()> {
        use diesel_migrations::MigrationHarness as _;

        let mut conn = self
            .pool
            .get()
            .wrap_err("failed to get connection for migrations")?;

        conn.run_pending_migrations(crate::MIGRATIONS)
            .map_err(|e| color_eyre::eyre::eyre!("migration failed: {}", e))?;

        Ok(())
    }

    fn conn(
        &self,
    ) -> color_eyre::eyre::Result<diesel::r2d2::PooledConnection<ConnectionManager<SqliteConnection>>>
    {
        self.pool
            .get()
            .wrap_err("failed to get database connection")
    }
}

fn row_to_device(row: DeviceRow) -> color_eyre::eyre::Result<Device> {
    let platform = Platform::parse(&row.platform)
        .ok_or_else(|| color_eyre::eyre::eyre!("unknown platform {:?}", row.platform))?;

    let variant = match platform {
        Platform::Gcm => DeviceVariant::Gcm {
            device_id: row.device_id,
        },
        Platform::Apns => DeviceVariant::Apns {
            device_id: row
                .device_id
                .as_deref()
                .map(uuid::Uuid::parse_str)
                .transpose()
                .wrap_err("invalid APNS device id")?,
        },
    };

    Ok(Device {
        name: row.name,
        active: row.active,
        owner: row.owner,
        registration_id: row.registration_id,
        variant,
        created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
    })
}

impl DeviceStore for SqliteStorage {
    fn register(&self, device: &NewDevice) -> color_eyre::eyre::Result<Device> {
        let mut conn = self.conn()?;
        let now = chrono::Utc::now().naive_utc();

        let platform = device.variant.platform();
        let device_id = device.variant.device_id_text();

        let new_row = NewDeviceRow {
            platform: platform.as_str(),
            name: device.name.as_deref(),
            active: true,
            owner: device.owner.as_deref(),
            device_id: device_id.as_deref(),
            registration_id: &device.registration_id,
            created_at: now,
            updated_at: now,
        };

        conn.immediate_transaction::<_, diesel::result::Error, _>(|conn| {
            // Last-write-wins identity: drop any record sharing the vendor
            // device id, and for APNS also the registration id.
            if let Some(ref device_id) = device_id {
                diesel::delete(
                    devices::table
                        .filter(devices::platform.eq(platform.as_str()))
                        .filter(devices::device_id.eq(device_id)),
                )
                .execute(conn)?;
            }

            if platform == Platform::Apns {
                diesel::delete(
                    devices::table
                        .filter(devices::platform.eq(platform.as_str()))
                        .filter(devices::registration_id.eq(&device.registration_id)),
                )
                .execute(conn)?;
            }

            diesel::insert_into(devices::table)
                .values(&new_row)
                .execute(conn)?;

            Ok(())
        })
        .wrap_err("failed to register device")?;

        tracing::debug!(
            platform = %platform,
            registration_id = %device.registration_id,
            "device registered"
        );

        Ok(Device {
            name: device.name.clone(),
            active: true,
            owner: device.owner.clone(),
            registration_id: device.registration_id.clone(),
            variant: device.variant.clone(),
            created_at: DateTime::from_naive_utc_and_offset(now, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(now, Utc),
        })
    }

    fn find_by_registration_id(
        &self,
        platform: Platform,
        registration_id: &str,
    ) -> color_eyre::eyre::Result<Option<Device>> {
        let mut conn = self.conn()?;

        let row: Option<DeviceRow> = devices::table
            .filter(devices::platform.eq(platform.as_str()))
            .filter(devices::registration_id.eq(registration_id))
            .select(DeviceRow::as_select())
            .first(&mut conn)
            .optional()
            .wrap_err("failed to look up device")?;

        row.map(row_to_device).transpose()
    }

    fn save(&self, device: &Device) -> color_eyre::eyre::Result<()> {
        let mut conn = self.conn()?;
        let now = chrono::Utc::now().naive_utc();

        diesel::update(
            devices::table
                .filter(devices::platform.eq(device.platform().as_str()))
                .filter(devices::registration_id.eq(&device.registration_id)),
        )
        .set((
            devices::name.eq(device.name.as_deref()),
            devices::owner.eq(device.owner.as_deref()),
            devices::active.eq(device.active),
            devices::updated_at.eq(now),
        ))
        .execute(&mut conn)
        .wrap_err("failed to save device")?;

        Ok(())
    }

    fn deactivate(
        &self,
        platform: Platform,
        registration_id: &str,
    ) -> color_eyre::eyre::Result<bool> {
        let mut conn = self.conn()?;
        let now = chrono::Utc::now().naive_utc();

        let affected = diesel::update(
            devices::table
                .filter(devices::platform.eq(platform.as_str()))
                .filter(devices::registration_id.eq(registration_id)),
        )
        .set((devices::active.eq(false), devices::updated_at.eq(now)))
        .execute(&mut conn)
        .wrap_err("failed to deactivate device")?;

        Ok(affected > 0)
    }

    fn rewrite_registration_id(
        &self,
        platform: Platform,
        old: &str,
        new: &str,
    ) -> color_eyre::eyre::Result<bool> {
        let mut conn = self.conn()?;
        let now = chrono::Utc::now().naive_utc();

        let affected = diesel::update(
            devices::table
                .filter(devices::platform.eq(platform.as_str()))
                .filter(devices::registration_id.eq(old)),
        )
        .set((
            devices::registration_id.eq(new),
            devices::updated_at.eq(now),
        ))
        .execute(&mut conn)
        .wrap_err("failed to rewrite registration id")?;

        Ok(affected > 0)
    }

    fn active_registration_ids(
        &self,
        platform: Platform,
        owner: &str,
    ) -> color_eyre::eyre::Result<Vec<String>> {
        let mut conn = self.conn()?;

        devices::table
            .filter(devices::platform.eq(platform.as_str()))
            .filter(devices::owner.eq(owner))
            .filter(devices::active.eq(true))
            .order(devices::id.asc())
            .select(devices::registration_id)
            .load(&mut conn)
            .wrap_err("failed to load active registration ids")
    }

    fn list_by_owner(
        &self,
        platform: Platform,
        owner: &str,
    ) -> color_eyre::eyre::Result<Vec<Device>> {
        let mut conn = self.conn()?;

        let rows: Vec<DeviceRow> = devices::table
            .filter(devices::platform.eq(platform.as_str()))
            .filter(devices::owner.eq(owner))
            .order(devices::id.asc())
            .select(DeviceRow::as_select())
            .load(&mut conn)
            .wrap_err("failed to list devices")?;

        rows.into_iter().map(row_to_device).collect()
    }

    fn delete_by_registration_id(
        &self,
        platform: Platform,
        registration_id: &str,
    ) -> color_eyre::eyre::Result<bool> {
        let mut conn = self.conn()?;

        let affected = diesel::delete(
            devices::table
                .filter(devices::platform.eq(platform.as_str()))
                .filter(devices::registration_id.eq(registration_id)),
        )
        .execute(&mut conn)
        .wrap_err("failed to delete device")?;

        Ok(affected > 0)
    }
}
