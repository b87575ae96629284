use crate::error::TasselResult;
use serde::Deserialize;
use sqlx::PgConnection;
use uuid::Uuid;

pub mod staff;
pub mod student;

#[derive(Deserialize)]
pub struct IdForm {
    pub id: Uuid,
}

pub trait DataType: Sized {
    type Id;
    type FormForAdding;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut PgConnection) -> TasselResult<Option<Self>>;
    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut PgConnection,
    ) -> TasselResult<Self::Id>;
    async fn remove_from_database(id: Self::Id, conn: &mut PgConnection) -> TasselResult<()>;
}
