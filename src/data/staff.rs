use crate::{
    data::DataType,
    error::{BcryptSnafu, EmailSnafu, MakeQuerySnafu, TasselResult},
};
use axum_login::AuthUser;
use bcrypt::DEFAULT_COST;
use email_address::EmailAddress;
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;
use sqlx::PgConnection;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StaffUser {
    pub id: Uuid,
    pub name: String,
    pub email: EmailAddress,
    pub bcrypt_hashed_password: SecretString,
}

pub struct AddStaffForm {
    pub name: String,
    pub email: EmailAddress,
    pub password: SecretString,
}

impl DataType for StaffUser {
    type Id = Uuid;
    type FormForAdding = AddStaffForm;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut PgConnection) -> TasselResult<Option<Self>> {
        let Some((name, email, hash)) = sqlx::query_as::<_, (String, String, String)>(
            "SELECT name, email, bcrypt_hashed_password FROM staff WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .context(MakeQuerySnafu)?
        else {
            return Ok(None);
        };

        let email = EmailAddress::from_str(&email).context(EmailSnafu)?;

        Ok(Some(Self {
            id,
            name,
            email,
            bcrypt_hashed_password: SecretString::from(hash),
        }))
    }

    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut PgConnection,
    ) -> TasselResult<Self::Id> {
        let AddStaffForm {
            name,
            email,
            password,
        } = to_be_added;

        let hashed = tokio::task::spawn_blocking(move || {
            bcrypt::hash(password.expose_secret().as_bytes(), DEFAULT_COST)
        })
        .await
        .expect("unable to join tokio task")
        .context(BcryptSnafu)?;

        sqlx::query_scalar::<_, Uuid>("INSERT INTO staff (name, email, bcrypt_hashed_password) VALUES ($1, $2, $3) ON CONFLICT (email) DO UPDATE SET name = $1, bcrypt_hashed_password = $3 RETURNING id")
            .bind(name)
            .bind(email.as_str())
            .bind(hashed)
            .fetch_one(conn)
            .await
            .context(MakeQuerySnafu)
    }

    async fn remove_from_database(id: Self::Id, conn: &mut PgConnection) -> TasselResult<()> {
        sqlx::query("DELETE FROM staff WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .context(MakeQuerySnafu)?;
        Ok(())
    }
}

impl StaffUser {
    pub async fn get_by_email(email: &str, conn: &mut PgConnection) -> TasselResult<Option<Self>> {
        let Some(id) = sqlx::query_scalar::<_, Uuid>("SELECT id FROM staff WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *conn)
            .await
            .context(MakeQuerySnafu)?
        else {
            return Ok(None);
        };

        Self::get_from_db_by_id(id, conn).await
    }

    pub async fn any_exist(conn: &mut PgConnection) -> TasselResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT exists(SELECT 1 FROM staff)")
            .fetch_one(conn)
            .await
            .context(MakeQuerySnafu)
    }
}

impl AuthUser for StaffUser {
    type Id = Uuid;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn session_auth_hash(&self) -> &[u8] {
        self.bcrypt_hashed_password.expose_secret().as_bytes()
    }
}
