//! Alert fragments for displaying error messages to users.
//!
//! Endpoints return these fragments when a request fails so HTMX can swap
//! them into the page's alert container.

use maud::{Markup, html};

/// Renders a dismissable error alert with a bold `message` and plain `details`.
pub fn error_alert(message: &str, details: &str) -> Markup {
    html!(
        div
            class="flex items-start p-4 mb-4 rounded-lg shadow text-red-800
                bg-red-50 dark:bg-gray-800 dark:text-red-400"
            role="alert"
            data-alert-type="error"
        {
            div class="text-sm font-medium"
            {
                p class="font-semibold" { (message) }

                @if !details.is_empty()
                {
                    p { (details) }
                }
            }

            button
                type="button"
                class="ms-auto -mx-1.5 -my-1.5 rounded-lg p-1.5 inline-flex
                    items-center justify-center h-8 w-8 text-red-500
                    hover:bg-red-200 dark:hover:bg-gray-700"
                onclick="this.closest('[role=alert]').remove()"
                aria-label="Close"
            {
                "\u{2715}"
            }
        }
    )
}
