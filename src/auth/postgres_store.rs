use crate::{
    error::{
        InvalidChronoDateTimeSnafu, InvalidDateTimeSnafu, MakeQuerySnafu, RmpSerdeEncodeSnafu,
        TasselError,
    },
    state::TasselState,
};
use async_trait::async_trait;
use axum_login::tower_sessions::{
    ExpiredDeletion, SessionStore,
    cookie::time::OffsetDateTime,
    session::{Id, Record},
    session_store::Error as SSError,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use snafu::{OptionExt, ResultExt};
use sqlx::PgConnection;

#[derive(Debug, Clone)]
pub struct PostgresSessionStore {
    state: TasselState,
}

impl PostgresSessionStore {
    pub const fn new(state: TasselState) -> Self {
        Self { state }
    }

    async fn id_exists(id: Id, conn: &mut PgConnection) -> Result<bool, TasselError> {
        sqlx::query_scalar::<_, bool>("SELECT exists(SELECT 1 FROM sessions WHERE id = $1)")
            .bind(id.to_string())
            .fetch_one(conn)
            .await
            .context(MakeQuerySnafu)
    }

    async fn save_session(record: &Record, conn: &mut PgConnection) -> Result<(), TasselError> {
        //tower-sessions hands us `time` datetimes, the database speaks chrono
        let expiry: DateTime<FixedOffset> = DateTime::from_naive_utc_and_offset(
            NaiveDateTime::new(
                NaiveDate::from_ymd_opt(
                    record.expiry_date.year(),
                    u32::from(record.expiry_date.month() as u8),
                    u32::from(record.expiry_date.day()),
                )
                .context(InvalidDateTimeSnafu {
                    odt: record.expiry_date,
                })?,
                NaiveTime::from_hms_nano_opt(
                    u32::from(record.expiry_date.hour()),
                    u32::from(record.expiry_date.minute()),
                    u32::from(record.expiry_date.second()),
                    record.expiry_date.nanosecond(),
                )
                .context(InvalidDateTimeSnafu {
                    odt: record.expiry_date,
                })?,
            ),
            FixedOffset::east_opt(record.expiry_date.offset().whole_seconds())
                .expect("time invariants broken"),
        );

        let serialised_data = rmp_serde::to_vec(&record.data).context(RmpSerdeEncodeSnafu)?;

        sqlx::query("INSERT INTO sessions VALUES ($1, $2, $3) ON CONFLICT (id) DO UPDATE SET data = excluded.data, expiry_date = excluded.expiry_date")
            .bind(record.id.to_string())
            .bind(serialised_data)
            .bind(expiry)
            .execute(conn)
            .await
            .context(MakeQuerySnafu)?;

        Ok(())
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create(&self, session_record: &mut Record) -> Result<(), SSError> {
        let mut connection = self
            .state
            .get_connection()
            .await
            .map_err(|e| SSError::Backend(e.to_string()))?;

        while Self::id_exists(session_record.id, &mut connection)
            .await
            .map_err(|e| SSError::Encode(e.to_string()))?
        {
            session_record.id = Id::default();
        }

        Self::save_session(session_record, &mut connection)
            .await
            .map_err(|e| SSError::Encode(e.to_string()))?;

        Ok(())
    }

    async fn save(&self, session_record: &Record) -> Result<(), SSError> {
        let mut connection = self
            .state
            .get_connection()
            .await
            .map_err(|e| SSError::Backend(e.to_string()))?;

        Self::save_session(session_record, &mut connection)
            .await
            .map_err(|e| SSError::Encode(e.to_string()))?;

        Ok(())
    }

    async fn load(&self, session_id: &Id) -> Result<Option<Record>, SSError> {
        let mut connection = self
            .state
            .get_connection()
            .await
            .map_err(|e| SSError::Backend(e.to_string()))?;

        let Some((data, expiry_date)) =
            sqlx::query_as::<_, (Vec<u8>, DateTime<chrono::Utc>)>(
                "SELECT data, expiry_date FROM sessions WHERE id = $1",
            )
            .bind(session_id.to_string())
            .fetch_optional(&mut *connection)
            .await
            .context(MakeQuerySnafu)
            .map_err(|e| SSError::Decode(e.to_string()))?
        else {
            return Ok(None);
        };

        let data = rmp_serde::from_slice(&data).map_err(|e| SSError::Decode(e.to_string()))?;

        let expiry_date = OffsetDateTime::from_unix_timestamp(expiry_date.timestamp())
            .context(InvalidChronoDateTimeSnafu {
                utc_dt: expiry_date,
            })
            .map_err(|e| SSError::Decode(e.to_string()))?;

        Ok(Some(Record {
            id: *session_id,
            data,
            expiry_date,
        }))
    }

    async fn delete(&self, session_id: &Id) -> Result<(), SSError> {
        let mut connection = self
            .state
            .get_connection()
            .await
            .map_err(|e| SSError::Backend(e.to_string()))?;

        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id.to_string())
            .execute(&mut *connection)
            .await
            .context(MakeQuerySnafu)
            .map_err(|e| SSError::Backend(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for PostgresSessionStore {
    async fn delete_expired(&self) -> Result<(), SSError> {
        let mut connection = self
            .state
            .get_connection()
            .await
            .map_err(|e| SSError::Backend(e.to_string()))?;

        sqlx::query("DELETE FROM sessions WHERE expiry_date < now()")
            .execute(&mut *connection)
            .await
            .context(MakeQuerySnafu)
            .map_err(|e| SSError::Backend(e.to_string()))?;
        Ok(())
    }
}
