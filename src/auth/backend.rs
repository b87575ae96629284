use crate::{
    data::{DataType, staff::StaffUser},
    error::{BcryptSnafu, TasselError},
    state::TasselState,
};
use async_trait::async_trait;
use axum_login::{AuthnBackend, UserId};
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;

#[derive(Clone)]
pub struct TasselAuthBackend {
    state: TasselState,
}

impl TasselAuthBackend {
    pub const fn new(state: TasselState) -> Self {
        Self { state }
    }
}

pub enum TasselAuthCredentials {
    EmailPassword {
        email: String,
        password: SecretString,
    },
}

#[async_trait]
impl AuthnBackend for TasselAuthBackend {
    type User = StaffUser;
    type Credentials = TasselAuthCredentials;
    type Error = TasselError;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        let mut conn = self.state.get_connection().await?;

        match creds {
            TasselAuthCredentials::EmailPassword { email, password } => {
                let Some(user) = StaffUser::get_by_email(&email, &mut conn).await? else {
                    return Ok(None);
                };

                let hash = user.bcrypt_hashed_password.clone();
                let password_verification_result = tokio::task::spawn_blocking(move || {
                    bcrypt::verify(password.expose_secret(), hash.expose_secret())
                })
                .await
                .expect("unable to join tokio task")
                .context(BcryptSnafu)?;

                Ok(if password_verification_result {
                    Some(user)
                } else {
                    None
                })
            }
        }
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        StaffUser::get_from_db_by_id(*user_id, &mut *self.state.get_connection().await?).await
    }
}
