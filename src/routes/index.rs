use crate::{
    auth::TasselSession,
    data::student::{GraduationStatus, StatusBadge, Student, StudentFilter, StudentPage},
    error::TasselResult,
    maud_conveniences::{escape, subtitle, supertitle},
    state::TasselState,
};
use axum::extract::{Query, State};
use maud::{Markup, html};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct ListingQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub lookup_failed: Option<bool>,
}

///The public announcements page. With no explicit filter this only shows
///graduated students; the status counts always cover the whole table.
pub async fn get_index_route(
    State(state): State<TasselState>,
    session: TasselSession,
    Query(query): Query<ListingQuery>,
) -> TasselResult<Markup> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => Some(GraduationStatus::Graduated),
        Some(other) => Some(other.parse()?),
    };
    let filter = StudentFilter::new(status, query.search);
    let page_number = query.page.unwrap_or(1).max(1);

    let mut first_conn = state.get_connection().await?;
    let mut second_conn = state.get_connection().await?;
    let (page, stats) = futures::try_join!(
        Student::search(&filter, page_number, &mut first_conn),
        Student::status_counts(&mut second_conn),
    )?;

    let lookup_failed = query.lookup_failed.unwrap_or(false);

    Ok(state.render(session, html! {
        div class="container mx-auto px-4 pb-8 max-w-6xl w-full" {
            (supertitle("🎓 School Graduation Announcements"))
            p class="text-gray-400 text-lg mb-6" {"Celebrate our graduates and check graduation status"}

            @if lookup_failed {
                div role="alert" class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" {
                    // same answer whether the identifier was mistyped or never existed
                    span {"Student not found. Please check the student ID and try again."}
                }
            }

            div class="grid grid-cols-1 md:grid-cols-3 gap-6 mb-8" {
                (stat_card("Total Graduates", stats.graduated, "text-green-400"))
                (stat_card("Pending Students", stats.pending, "text-yellow-400"))
                (stat_card("Incomplete", stats.incomplete, "text-red-400"))
            }

            div class="bg-gray-800 rounded shadow-md p-4 mb-8" {
                (subtitle("🔍 Quick Student Lookup"))
                form method="post" action="/search" class="flex flex-row gap-4" {
                    input required type="text" id="student_id" name="student_id" placeholder="Enter Student ID (e.g., STU1234)" class="shadow appearance-none border rounded flex-1 py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";
                    button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                        "Find Student"
                    }
                }
            }

            form method="get" action="/" class="mb-6 flex flex-col sm:flex-row gap-4" {
                input type="text" name="search" value=[filter.search.as_deref()] placeholder="Search by name, student ID, or major..." class="shadow appearance-none border rounded flex-1 py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";
                select name="status" class="shadow appearance-none border rounded py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {
                    @for option in GraduationStatus::ALL {
                        option value=(option) selected[filter.status == Some(option)] {(option.label())}
                    }
                }
                button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                    "Search"
                }
            }

            p class="text-gray-400 mb-4" {
                "Showing "
                (page.students.len())
                " of "
                (page.total_records)
                " students"
            }

            @if page.students.is_empty() {
                div class="bg-gray-800 rounded shadow-md text-center py-12" {
                    h3 class="text-lg font-medium mb-2" {"No students found"}
                    p class="text-gray-400" {"Try adjusting your search criteria or filter settings."}
                }
            } @else {
                div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-6 mb-8" {
                    @for student in &page.students {
                        (student_card(student))
                    }
                }
            }

            (pagination_links(&page, &filter))
        }
    }))
}

fn stat_card(label: &'static str, count: i64, colour: &'static str) -> Markup {
    html! {
        div class="bg-gray-800 rounded shadow-md p-4" {
            p class="text-sm font-medium text-gray-400" {(label)}
            p class={"text-2xl font-bold " (colour)} {(count)}
        }
    }
}

fn student_card(student: &Student) -> Markup {
    html! {
        div class="bg-gray-800 rounded-lg shadow-md p-4 hover:bg-gray-700" {
            div class="flex justify-between items-start mb-2" {
                div {
                    p class="text-lg font-semibold" {(student.name)}
                    p class="text-sm text-gray-400" {
                        "ID: "
                        (student.student_id)
                    }
                }
                (StatusBadge(student.graduation_status))
            }
            p {
                strong {"Major: "}
                (student.major)
            }
            @if let Some(date) = student.graduation_date {
                p {
                    strong {"Graduation Date: "}
                    (date.format("%B %-d, %Y"))
                }
            }
            @if let Some(notes) = &student.notes {
                p class="text-sm text-gray-400 italic" {(escape(notes))}
            }
        }
    }
}

fn pagination_links(page: &StudentPage, filter: &StudentFilter) -> Markup {
    if page.total_pages <= 1 {
        return Markup::default();
    }

    let link_for = |target: i64| {
        let mut href = format!("/?page={target}");
        if let Some(status) = filter.status {
            href += &format!("&status={status}");
        }
        if let Some(search) = &filter.search {
            href += &format!("&search={search}");
        }
        href
    };

    html! {
        div class="flex justify-center items-center space-x-4" {
            @if page.page > 1 {
                a href=(link_for(page.page - 1)) class="bg-gray-700 hover:bg-gray-600 py-2 px-4 rounded" {"Previous"}
            }
            span class="text-gray-400" {
                "Page "
                (page.page)
                " of "
                (page.total_pages)
            }
            @if page.page < page.total_pages {
                a href=(link_for(page.page + 1)) class="bg-gray-700 hover:bg-gray-600 py-2 px-4 rounded" {"Next"}
            }
        }
    }
}
