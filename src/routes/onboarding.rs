use crate::{
    auth::TasselSession,
    data::{
        DataType,
        staff::{AddStaffForm, StaffUser},
    },
    error::{CommitTransactionSnafu, TasselResult},
    maud_conveniences::{errors_list, form_submit_button, simple_form_element, supertitle},
    state::TasselState,
};
use axum::{
    Form,
    body::Body,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use bitflags::bitflags;
use email_address::EmailAddress;
use maud::html;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use snafu::ResultExt;

//a fresh install has nobody to log in as, so the first visit sets up the
//first staff account

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    struct NewStaffDetailsError: u8 {
        const EMPTY_NAME =        0b0000_0001;
        const EMPTY_PASSWORD =    0b0000_0010;
        const MISMATCH_PASSWORD = 0b0000_0100;
    }
}

impl NewStaffDetailsError {
    pub fn as_nice_list(&self) -> impl Iterator<Item = &'static str> {
        self.iter().filter_map(|x| match x {
            Self::EMPTY_NAME => Some("Provided name was empty"),
            Self::EMPTY_PASSWORD => Some("Provided password was empty"),
            Self::MISMATCH_PASSWORD => Some("Passwords didn't match"),
            _ => None,
        })
    }
}

#[derive(Deserialize)]
pub struct OnboardingQuery {
    errors: Option<u8>,
}

pub async fn get_start_onboarding(
    State(state): State<TasselState>,
    session: TasselSession,
    Query(OnboardingQuery { errors }): Query<OnboardingQuery>,
) -> TasselResult<Response<Body>> {
    //double check that no staff exist
    if StaffUser::any_exist(&mut *state.get_connection().await?).await? {
        return Ok(Redirect::to("/login").into_response());
    }

    let errors = errors.map_or_else(
        NewStaffDetailsError::empty,
        NewStaffDetailsError::from_bits_truncate,
    );

    Ok(state.render(session, html! {
        div class="flex items-center justify-center" {
            div class="bg-gray-800 p-8 rounded-lg shadow-xl w-full max-w-md" {
                (supertitle("Create first Staff Account"))

                @if !errors.is_empty() {
                    (errors_list(errors.as_nice_list()))
                }

                form method="post" {
                    (simple_form_element("name", "Name", true, None, None))
                    (simple_form_element("email", "Email", true, Some("email"), None))
                    (simple_form_element("password", "Password", true, Some("password"), None))
                    (simple_form_element("confirm_password", "Confirm Password", true, Some("password"), None))
                    (form_submit_button(Some("Create Staff Account")))
                }
            }
        }
    }).into_response())
}

#[derive(Deserialize)]
pub struct CreateStaffAccountForm {
    name: String,
    email: EmailAddress,
    password: SecretString,
    confirm_password: SecretString,
}

pub async fn post_create_staff(
    State(state): State<TasselState>,
    mut session: TasselSession,
    Form(CreateStaffAccountForm {
        name,
        email,
        password,
        confirm_password,
    }): Form<CreateStaffAccountForm>,
) -> TasselResult<Redirect> {
    let mut conn = state.get_transaction().await?;

    //double check that no staff exist
    if StaffUser::any_exist(&mut conn).await? {
        return Ok(Redirect::to("/login"));
    }

    let mut errors = NewStaffDetailsError::empty();
    if name.trim().is_empty() {
        errors |= NewStaffDetailsError::EMPTY_NAME;
    }
    if password.expose_secret().trim().is_empty() {
        errors |= NewStaffDetailsError::EMPTY_PASSWORD;
    }
    if password.expose_secret() != confirm_password.expose_secret() {
        errors |= NewStaffDetailsError::MISMATCH_PASSWORD;
    }

    if !errors.is_empty() {
        return Ok(Redirect::to(&format!("/onboarding?errors={}", errors.bits())));
    }

    let id = StaffUser::insert_into_database(
        AddStaffForm {
            name,
            email,
            password,
        },
        &mut conn,
    )
    .await?;

    let user = StaffUser::get_from_db_by_id(id, &mut conn)
        .await?
        .expect("just added staff member to the database w/o issue");
    conn.commit().await.context(CommitTransactionSnafu)?;

    session.login(&user).await?;

    Ok(Redirect::to("/students"))
}
