use crate::data::staff::StaffUser;
use maud::{Escaper, Markup, PreEscaped, Render, html};
use std::fmt::Write;

pub fn render_table<const N: usize>(
    overall_title: &'static str,
    titles: [&'static str; N],
    items: Vec<[Markup; N]>,
) -> Markup {
    html! {
        div class="container mx-auto" {
            (title(overall_title))
            div class="overflow-x-auto" {
                table class="min-w-full bg-gray-800 rounded shadow-md" {
                    thead class="bg-gray-700" {
                        tr {
                            @for title in titles {
                                th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                            }
                        }
                    }
                    tbody {
                        @for row in items {
                            tr {
                                @for col in row {
                                    td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn escape(s: impl AsRef<str>) -> PreEscaped<String> {
    let mut output = String::new();
    Escaper::new(&mut output).write_str(s.as_ref()).unwrap(); //this method always succeeds - strange api!
    PreEscaped(output)
}

pub fn supertitle(s: impl Render) -> Markup {
    html! {
        h1 class="text-3xl font-bold mb-6" {(s)}
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn subtitle(s: impl Render) -> Markup {
    html! {
        h2 class="text-xl font-semibold mb-2" {(s)}
    }
}

pub fn simple_form_element(
    name: &'static str,
    label: &'static str,
    required: bool,
    input_type: Option<&'static str>,
    value: Option<&str>,
) -> Markup {
    html! {
        div class="mb-4" {
            label for=(name) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            input required[required] type=(input_type.unwrap_or("text")) id=(name) name=(name) value=[value] class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";
        }
    }
}

pub fn form_element(id: &'static str, label: &'static str, inner: Markup) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            (inner)
        }
    }
}

pub fn form_submit_button(text: Option<&'static str>) -> Markup {
    html! {
        div class="flex items-center justify-between" {
            button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                (text.unwrap_or("Submit"))
            }
        }
    }
}

pub fn errors_list(errors: impl IntoIterator<Item = &'static str>) -> Markup {
    html! {
        div role="alert" class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" {
            strong class="font-bold" {"Please fix the following:"}
            ul class="list-disc list-inside" {
                @for error in errors {
                    li {(error)}
                }
            }
        }
    }
}

pub fn render_nav(user: Option<StaffUser>) -> Markup {
    html! {
        nav class="w-full bg-gray-800 shadow-md mb-8" {
            div class="container mx-auto flex flex-row items-center justify-between py-3 px-4" {
                a href="/" class="text-xl font-bold" {"🎓 Tassel"}
                div class="flex flex-row items-center space-x-4" {
                    a href="/" class="hover:text-blue-300" {"Announcements"}
                    @if let Some(user) = user {
                        a href="/students" class="hover:text-blue-300" {"Students"}
                        a href="/import" class="hover:text-blue-300" {"Import"}
                        form method="post" action="/logout" class="inline" {
                            button type="submit" class="hover:text-blue-300" {
                                "Logout ("
                                (user.name)
                                ")"
                            }
                        }
                    } @else {
                        a href="/login" class="hover:text-blue-300" {"Staff Login"}
                    }
                }
            }
        }
    }
}
