use crate::{
    auth::backend::TasselAuthBackend,
    error::{TasselError, TasselResult},
};
use axum_login::AuthSession;

pub mod backend;
pub mod postgres_store;

pub type TasselSession = AuthSession<TasselAuthBackend>;

///There is exactly one level of privilege here: you are staff, or you are the
///public.
pub trait AuthUtilities {
    fn is_staff(&self) -> bool;
    fn ensure_staff(&self) -> TasselResult<()>;
}

impl AuthUtilities for TasselSession {
    fn is_staff(&self) -> bool {
        self.user.is_some()
    }

    fn ensure_staff(&self) -> TasselResult<()> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(TasselError::NotLoggedIn)
        }
    }
}
