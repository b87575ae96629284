use crate::{
    auth::{AuthUtilities, TasselSession},
    data::{
        DataType, IdForm,
        student::{
            GraduationStatus, StatusBadge, Student, StudentDetails, StudentDetailsError,
            StudentFilter, StudentPage,
        },
    },
    error::{TasselError, TasselResult},
    maud_conveniences::{
        errors_list, escape, form_element, form_submit_button, render_table, simple_form_element,
        title,
    },
    state::TasselState,
};
use axum::{
    Form,
    body::Body,
    extract::{Query, State},
    http::Response,
    response::{IntoResponse, Redirect},
};
use maud::{Markup, Render, html};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct StudentsPageQuery {
    imported: Option<bool>,
}

pub async fn get_students(
    State(state): State<TasselState>,
    session: TasselSession,
    Query(StudentsPageQuery { imported }): Query<StudentsPageQuery>,
) -> Response<Body> {
    if !session.is_staff() {
        return Redirect::to("/login?to=/students").into_response();
    }

    state
        .render(
            session,
            html! {
                div class="mx-auto bg-gray-800 p-8 rounded shadow-md max-w-6xl w-full flex flex-col space-y-4" {
                    @if imported.unwrap_or(false) {
                        div role="alert" class="bg-green-100 border border-green-400 text-green-700 px-4 py-3 rounded relative" {
                            span {"Students imported successfully."}
                        }
                    }
                    div class="flex flex-row items-center justify-between" {
                        (title("Manage Students"))
                        button class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" hx-get="/internal/students/new_form" hx-target="#in_focus" {
                            "Add new Student"
                        }
                    }
                    div class="container flex flex-col space-y-4" {
                        div id="all_students" hx-get="/internal/students" hx-trigger="load" {}
                        div id="in_focus" {}
                    }
                }
            },
        )
        .into_response()
}

#[derive(Deserialize, Default)]
pub struct StaffListingQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
}

///The staff listing applies no default status filter - everyone shows up
///until the dropdown says otherwise.
pub async fn internal_get_students(
    State(state): State<TasselState>,
    session: TasselSession,
    Query(query): Query<StaffListingQuery>,
) -> TasselResult<Markup> {
    session.ensure_staff()?;

    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(other) => Some(other.parse()?),
    };
    let filter = StudentFilter::new(status, query.search);
    let page_number = query.page.unwrap_or(1).max(1);

    let page = Student::search(&filter, page_number, &mut *state.get_connection().await?).await?;

    Ok(students_fragment(&page, &filter))
}

fn students_fragment(page: &StudentPage, filter: &StudentFilter) -> Markup {
    let rows = page
        .students
        .iter()
        .map(|student| {
            [
                escape(&student.student_id),
                html! {
                    a hx-get="/internal/students/in_detail" hx-target="#in_focus" hx-vals={"{\"id\": \"" (student.id) "\"}" } class="hover:text-blue-300 underline cursor-pointer" {
                        (student.name)
                    }
                },
                escape(&student.major),
                StatusBadge(student.graduation_status).render(),
                escape(
                    student
                        .graduation_date
                        .map_or_else(|| "N/A".to_string(), |d| d.format("%d/%m/%y").to_string()),
                ),
                html! {
                    button class="bg-blue-600 hover:bg-blue-800 font-bold py-1 px-2 rounded mr-2" hx-get="/internal/students/edit_form" hx-target="#in_focus" hx-vals={"{\"id\": \"" (student.id) "\"}" } {
                        "Edit"
                    }
                    button class="bg-red-600 hover:bg-red-800 font-bold py-1 px-2 rounded" hx-delete="/students" hx-target="#in_focus" hx-vals={"{\"id\": \"" (student.id) "\"}" } {
                        "Delete"
                    }
                },
            ]
        })
        .collect();

    html! {
        div class="flex flex-col space-y-4" {
            form hx-get="/internal/students" hx-target="#all_students" class="flex flex-row gap-4" {
                input type="text" name="search" value=[filter.search.as_deref()] placeholder="Search by name, student ID, or major..." class="shadow appearance-none border rounded flex-1 py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";
                select name="status" class="shadow appearance-none border rounded py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {
                    option value="" selected[filter.status.is_none()] {"All Statuses"}
                    @for option in GraduationStatus::ALL {
                        option value=(option) selected[filter.status == Some(option)] {(option.label())}
                    }
                }
                button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                    "Filter"
                }
            }

            (render_table(
                "Students",
                ["Student ID", "Name", "Major", "Status", "Graduation Date", "Actions"],
                rows,
            ))

            p class="text-gray-400" {
                (page.students.len())
                " of "
                (page.total_records)
                " students"
            }

            @if page.total_pages > 1 {
                div class="flex justify-center items-center space-x-4" {
                    @if page.page > 1 {
                        button hx-get=(fragment_link(page.page - 1, filter)) hx-target="#all_students" class="bg-gray-700 hover:bg-gray-600 py-2 px-4 rounded" {"Previous"}
                    }
                    span class="text-gray-400" {
                        "Page "
                        (page.page)
                        " of "
                        (page.total_pages)
                    }
                    @if page.page < page.total_pages {
                        button hx-get=(fragment_link(page.page + 1, filter)) hx-target="#all_students" class="bg-gray-700 hover:bg-gray-600 py-2 px-4 rounded" {"Next"}
                    }
                }
            }
        }
    }
}

fn fragment_link(target: i64, filter: &StudentFilter) -> String {
    let mut href = format!("/internal/students?page={target}");
    if let Some(status) = filter.status {
        href += &format!("&status={status}");
    }
    if let Some(search) = &filter.search {
        href += &format!("&search={search}");
    }
    href
}

pub async fn internal_get_add_student_form(session: TasselSession) -> TasselResult<Markup> {
    session.ensure_staff()?;

    let blank = StudentDetails {
        graduation_status: GraduationStatus::Pending.to_string(),
        ..StudentDetails::default()
    };
    Ok(add_student_form(&blank, None))
}

pub async fn internal_get_edit_student_form(
    State(state): State<TasselState>,
    session: TasselSession,
    Query(IdForm { id }): Query<IdForm>,
) -> TasselResult<Markup> {
    session.ensure_staff()?;

    let Some(student) = Student::get_from_db_by_id(id, &mut *state.get_connection().await?).await?
    else {
        return Err(TasselError::MissingStudent { id });
    };

    Ok(edit_student_form(id, &StudentDetails::from(&student), None))
}

fn add_student_form(values: &StudentDetails, errors: Option<StudentDetailsError>) -> Markup {
    html! {
        (title("Add New Student"))

        @if let Some(errors) = errors {
            (errors_list(errors.as_nice_list()))
        }

        form hx-put="/internal/students" hx-trigger="submit" hx-target="#in_focus" class="p-4" {
            (student_form_fields(values))
            (form_submit_button(Some("Add Student")))
        }
    }
}

fn edit_student_form(id: Uuid, values: &StudentDetails, errors: Option<StudentDetailsError>) -> Markup {
    html! {
        (title("Edit Student"))

        @if let Some(errors) = errors {
            (errors_list(errors.as_nice_list()))
        }

        form hx-post="/internal/students" hx-trigger="submit" hx-target="#in_focus" class="p-4" {
            input type="hidden" name="id" value=(id);
            (student_form_fields(values))
            (form_submit_button(Some("Save Changes")))
        }
    }
}

fn student_form_fields(values: &StudentDetails) -> Markup {
    html! {
        (simple_form_element("student_id", "Student ID", true, None, Some(&values.student_id)))
        (simple_form_element("name", "Name", true, None, Some(&values.name)))
        (simple_form_element("major", "Major", true, None, Some(&values.major)))
        (form_element("graduation_status", "Graduation Status", html!{
            select id="graduation_status" name="graduation_status" class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {
                @for option in GraduationStatus::ALL {
                    option value=(option) selected[values.graduation_status == option.as_str()] {(option.label())}
                }
            }
        }))
        (simple_form_element("graduation_date", "Graduation Date (optional)", false, Some("date"), Some(&values.graduation_date)))
        (form_element("notes", "Notes (optional)", html!{
            textarea id="notes" name="notes" rows="3" class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {(values.notes)}
        }))
    }
}

pub async fn internal_put_new_student(
    State(state): State<TasselState>,
    session: TasselSession,
    Form(details): Form<StudentDetails>,
) -> TasselResult<Markup> {
    session.ensure_staff()?;

    let id = match Student::create(details.clone(), &mut *state.get_connection().await?).await? {
        Ok(id) => id,
        Err(errors) => return Ok(add_student_form(&details, Some(errors))),
    };

    let this_student =
        internal_get_student_in_detail(State(state.clone()), session.clone(), Query(IdForm { id }))
            .await?;
    let all_students = internal_get_students(
        State(state),
        session,
        Query(StaffListingQuery::default()),
    )
    .await?;

    Ok(html! {
        (this_student)
        div hx-swap-oob="outerHTML:#all_students" id="all_students" {
            (all_students)
        }
    })
}

#[derive(Deserialize)]
pub struct UpdateStudentForm {
    pub id: Uuid,
    pub student_id: String,
    pub name: String,
    pub major: String,
    pub graduation_status: String,
    pub graduation_date: String,
    pub notes: String,
}

impl UpdateStudentForm {
    fn into_parts(self) -> (Uuid, StudentDetails) {
        let Self {
            id,
            student_id,
            name,
            major,
            graduation_status,
            graduation_date,
            notes,
        } = self;

        (
            id,
            StudentDetails {
                student_id,
                name,
                major,
                graduation_status,
                graduation_date,
                notes,
            },
        )
    }
}

pub async fn internal_post_update_student(
    State(state): State<TasselState>,
    session: TasselSession,
    Form(form): Form<UpdateStudentForm>,
) -> TasselResult<Markup> {
    session.ensure_staff()?;

    let (id, details) = form.into_parts();

    if let Err(errors) =
        Student::update(id, details.clone(), &mut *state.get_connection().await?).await?
    {
        return Ok(edit_student_form(id, &details, Some(errors)));
    }

    let this_student =
        internal_get_student_in_detail(State(state.clone()), session.clone(), Query(IdForm { id }))
            .await?;
    let all_students = internal_get_students(
        State(state),
        session,
        Query(StaffListingQuery::default()),
    )
    .await?;

    Ok(html! {
        (this_student)
        div hx-swap-oob="outerHTML:#all_students" id="all_students" {
            (all_students)
        }
    })
}

pub async fn delete_student(
    State(state): State<TasselState>,
    session: TasselSession,
    Query(IdForm { id }): Query<IdForm>,
) -> TasselResult<Markup> {
    session.ensure_staff()?;

    Student::remove_from_database(id, &mut *state.get_connection().await?).await?;

    let all_students = internal_get_students(
        State(state),
        session,
        Query(StaffListingQuery::default()),
    )
    .await?;

    Ok(html! {
        div hx-swap-oob="outerHTML:#all_students" id="all_students" {
            (all_students)
        }
    })
}

pub async fn internal_get_student_in_detail(
    State(state): State<TasselState>,
    session: TasselSession,
    Query(IdForm { id }): Query<IdForm>,
) -> TasselResult<Markup> {
    session.ensure_staff()?;

    let Some(student) = Student::get_from_db_by_id(id, &mut *state.get_connection().await?).await?
    else {
        return Err(TasselError::MissingStudent { id });
    };

    Ok(html! {
        div class="container mx-auto" {
            div class="rounded-lg shadow-md overflow-hidden bg-gray-800 max-w-md mx-auto" {
                div class="p-4" {
                    div class="flex justify-between items-start mb-2" {
                        (title(student.name.clone()))
                        (StatusBadge(student.graduation_status))
                    }
                    p class="text-gray-200 font-semibold" {
                        "Student ID: "
                        span class="font-medium" {(student.student_id)}
                    }
                    p class="text-gray-200 font-semibold" {
                        "Major: "
                        span class="font-medium" {(student.major)}
                    }
                    @if let Some(date) = student.graduation_date {
                        p class="text-gray-200 font-semibold" {
                            "Graduation Date: "
                            span class="font-medium" {(date.format("%d/%m/%y"))}
                        }
                    }
                    @if let Some(notes) = &student.notes {
                        div class="py-2" {
                            p class="text-gray-200 font-semibold" {"Notes:"}
                            p class="text-gray-300" {(escape(notes))}
                        }
                    }
                    p class="text-sm text-gray-400 mt-2" {
                        "Created "
                        (student.created_at.format("%a %d/%m/%y @ %H:%M"))
                        ", last updated "
                        (student.updated_at.format("%a %d/%m/%y @ %H:%M"))
                    }

                    br;
                    button class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded mr-2" hx-get="/internal/students/edit_form" hx-target="#in_focus" hx-vals={"{\"id\": \"" (id) "\"}" } {
                        "Edit"
                    }
                    button class="bg-red-600 hover:bg-red-800 font-bold py-2 px-4 rounded" hx-delete="/students" hx-target="#in_focus" hx-vals={"{\"id\": \"" (id) "\"}" } {
                        "Delete"
                    }
                }
            }
        }
    })
}
