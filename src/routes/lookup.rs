use crate::{
    auth::TasselSession,
    data::student::{GraduationStatus, StatusBadge, Student},
    error::TasselResult,
    maud_conveniences::escape,
    state::TasselState,
};
use axum::{
    Form,
    body::Body,
    extract::State,
    http::Response,
    response::{IntoResponse, Redirect},
};
use maud::{Markup, html};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct LookupForm {
    student_id: String,
}

///Looks a student up by their identifier. Misses go back to the front page
///with one deliberately generic message - the response never says whether the
///identifier was malformed or just absent.
pub async fn post_lookup(
    State(state): State<TasselState>,
    session: TasselSession,
    Form(LookupForm { student_id }): Form<LookupForm>,
) -> TasselResult<Response<Body>> {
    let student_id = student_id.trim();
    if student_id.is_empty() {
        return Ok(Redirect::to("/?lookup_failed=true").into_response());
    }

    let Some(student) =
        Student::get_by_student_id(student_id, &mut *state.get_connection().await?).await?
    else {
        return Ok(Redirect::to("/?lookup_failed=true").into_response());
    };

    Ok(state
        .render(session, student_status_page(&student))
        .into_response())
}

fn student_status_page(student: &Student) -> Markup {
    html! {
        div class="container mx-auto px-4 pb-8 max-w-3xl w-full" {
            div class="mb-6" {
                a href="/" class="bg-gray-700 hover:bg-gray-600 py-2 px-4 rounded" {"← Back to Graduation List"}
            }

            div class="bg-gray-800 rounded-lg shadow-md p-6 mb-8" {
                div class="flex justify-between items-start mb-4" {
                    div {
                        h1 class="text-2xl font-semibold mb-1" {(student.name)}
                        p class="text-gray-400" {
                            "Student ID: "
                            (student.student_id)
                        }
                    }
                    (StatusBadge(student.graduation_status))
                }

                div class="grid grid-cols-1 md:grid-cols-2 gap-6" {
                    div {
                        h3 class="text-lg font-semibold mb-2" {"Academic Information"}
                        p class="text-sm text-gray-400" {"Major"}
                        p class="text-lg mb-2" {(student.major)}
                        @if let Some(date) = student.graduation_date {
                            p class="text-sm text-gray-400" {"Graduation Date"}
                            p class="text-lg" {(date.format("%B %-d, %Y"))}
                        }
                    }
                    div {
                        h3 class="text-lg font-semibold mb-2" {"Additional Information"}
                        @if let Some(notes) = &student.notes {
                            p class="text-sm text-gray-400" {"Notes"}
                            p class="mb-2" {(escape(notes))}
                        }
                        p class="text-sm text-gray-400" {"Record Created"}
                        p class="mb-2" {(student.created_at.format("%d/%m/%y"))}
                        p class="text-sm text-gray-400" {"Last Updated"}
                        p {(student.updated_at.format("%d/%m/%y"))}
                    }
                }
            }

            (status_message(student))
        }
    }
}

//what the student actually came here to read
fn status_message(student: &Student) -> Markup {
    let (border, heading_colour, heading, message) = match student.graduation_status {
        GraduationStatus::Graduated => (
            "border-green-400",
            "text-green-400",
            "🎉 Congratulations!",
            "You have successfully graduated! Your hard work and dedication have paid off.",
        ),
        GraduationStatus::Pending => (
            "border-yellow-400",
            "text-yellow-400",
            "⏳ Almost There!",
            "Your graduation is pending. Please check with the academic office for any remaining requirements.",
        ),
        GraduationStatus::Incomplete => (
            "border-red-400",
            "text-red-400",
            "📋 Requirements Pending",
            "There are outstanding requirements for graduation. Please contact the academic office for details.",
        ),
    };

    html! {
        div class={"bg-gray-800 rounded-lg shadow-md p-6 border-2 " (border)} {
            h2 class={"text-xl font-semibold mb-2 " (heading_colour)} {(heading)}
            p class="text-lg mb-4" {(message)}

            @match student.graduation_status {
                GraduationStatus::Graduated => {
                    div class="bg-gray-700 rounded-lg p-4 text-center" {
                        p class="text-lg font-medium" {
                            "🎓 Congratulations on your graduation from "
                            (student.major)
                            "! 🎓"
                        }
                    }
                }
                GraduationStatus::Pending | GraduationStatus::Incomplete => {
                    p class="text-sm text-gray-400" {"For more information about your graduation requirements, please contact:"}
                    ul class="mt-2 text-sm text-gray-400 space-y-1" {
                        li {"📧 Academic Office: academic@school.edu"}
                        li {"📞 Phone: (555) 123-4567"}
                        li {"🏢 Office Hours: Monday-Friday, 9:00 AM - 5:00 PM"}
                    }
                }
            }
        }
    }
}
