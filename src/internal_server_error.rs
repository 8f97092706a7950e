//! Defines the route handler and view for the internal server error page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// The text content of the internal server error page.
pub struct ErrorPageContent<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for ErrorPageContent<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

pub fn render_internal_server_error(content: ErrorPageContent<'_>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        error_view("Internal Server Error", "500", content.description, content.fix),
    )
        .into_response()
}

pub async fn get_internal_server_error_page() -> Response {
    render_internal_server_error(Default::default())
}
