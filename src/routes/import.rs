use crate::{
    auth::{AuthUtilities, TasselSession},
    error::{MissingImportFileSnafu, MultipartSnafu, TasselResult, UnsupportedImportFileSnafu},
    maud_conveniences::{escape, form_submit_button, render_table, subtitle, title},
    state::TasselState,
};
use axum::{
    body::Body,
    extract::{Multipart, State},
    http::Response,
    response::{IntoResponse, Redirect},
};
use maud::html;
use snafu::ResultExt;

const ALLOWED_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "csv"];

pub async fn get_import_page(
    State(state): State<TasselState>,
    session: TasselSession,
) -> Response<Body> {
    if !session.is_staff() {
        return Redirect::to("/login?to=/import").into_response();
    }

    state.render(session, html! {
        div class="mx-auto bg-gray-800 p-8 rounded shadow-md max-w-4xl w-full" {
            (title("Import Students from Excel"))
            p class="text-gray-400 mb-6" {"Bulk upload student graduation data using an Excel or CSV file"}

            div class="grid grid-cols-1 lg:grid-cols-2 gap-8" {
                div {
                    (subtitle("Upload File"))
                    form method="post" action="/import" enctype="multipart/form-data" {
                        label for="file" class="block text-sm font-medium text-gray-400 mb-2" {"Student Data File"}
                        input required type="file" name="file" id="file" accept=".xlsx,.xls,.csv" class="block w-full text-sm text-gray-300 file:mr-4 file:py-2 file:px-4 file:rounded file:border-0 file:text-sm file:font-semibold file:bg-violet-50 file:text-violet-700 hover:file:bg-violet-100 mb-4";
                        p class="text-sm text-gray-500 mb-4" {"Supports .xlsx, .xls, and .csv files up to 2MB"}

                        (form_submit_button(Some("Import Students")))
                    }
                }

                div class="overflow-scroll overflow-clip" {
                    (render_table(
                        "Expected Columns",
                        ["Column", "Example", "Required"],
                        vec![
                            [escape("student_id"), escape("STU1234"), escape("✅")],
                            [escape("name"), escape("John Doe"), escape("✅")],
                            [escape("major"), escape("Computer Science"), escape("✅")],
                            [escape("graduation_status"), escape("pending, graduated or incomplete"), escape("✅")],
                            [escape("graduation_date"), escape("2024-05-15"), escape("❌")],
                            [escape("notes"), escape("Dean's list"), escape("❌")],
                        ],
                    ))
                    p class="italic text-sm text-gray-400 mt-2" {"Student IDs must be unique. Dates use the YYYY-MM-DD format."}
                }
            }
        }
    }).into_response()
}

///Accepts the upload, checks it looks like a spreadsheet, and does nothing
///else with it - the reference system never implemented the actual parsing.
pub async fn post_import(
    session: TasselSession,
    mut multipart: Multipart,
) -> TasselResult<Redirect> {
    session.ensure_staff()?;

    let mut file_seen = false;
    while let Some(field) = multipart.next_field().await.context(MultipartSnafu)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let lowercase = filename.to_lowercase();
        snafu::ensure!(
            ALLOWED_EXTENSIONS
                .iter()
                .any(|ext| lowercase.ends_with(&format!(".{ext}"))),
            UnsupportedImportFileSnafu { filename }
        );

        //drain the body so the client gets a clean response
        let _ = field.bytes().await.context(MultipartSnafu)?;
        file_seen = true;
    }

    snafu::ensure!(file_seen, MissingImportFileSnafu);

    Ok(Redirect::to("/students?imported=true"))
}
