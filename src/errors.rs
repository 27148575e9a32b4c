use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    Template(askama::Error),
    Hash(String),
    Token(String),
    Session(String),
    Csrf(String),
    Unauthorized(String),
    PermissionDenied(String),
    BadRequest(String),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Token(e) => write!(f, "Token error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::Csrf(e) => write!(f, "CSRF error: {e}"),
            AppError::Unauthorized(e) => write!(f, "Unauthorized: {e}"),
            AppError::PermissionDenied(e) => write!(f, "Permission denied: {e}"),
            AppError::BadRequest(e) => write!(f, "Bad request: {e}"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::PermissionDenied(_) | AppError::Csrf(_) => StatusCode::FORBIDDEN,
            AppError::Session(_) | AppError::Unauthorized(_) | AppError::Token(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            AppError::NotFound => "Not Found".to_string(),
            AppError::PermissionDenied(reason) => reason.clone(),
            AppError::Csrf(_) => "Invalid or missing CSRF token".to_string(),
            AppError::Session(e) | AppError::Unauthorized(e) | AppError::Token(e) => e.clone(),
            AppError::BadRequest(e) => e.clone(),
            _ => {
                log::error!("{self}");
                "Internal Server Error".to_string()
            }
        };

        let mut builder = HttpResponse::build(status);
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header(("WWW-Authenticate", "Bearer"));
        }
        builder
            .content_type("text/html; charset=utf-8")
            .body(error_fragment(status, &message))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound,
            other => AppError::Db(other),
        }
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

/// Render an askama template into a 200 response.
pub fn render(tmpl: impl Template) -> Result<HttpResponse, AppError> {
    render_with_status(tmpl, StatusCode::OK)
}

/// Render an askama template with an explicit status, used to re-render a
/// form with its validation errors as 400.
pub fn render_with_status(tmpl: impl Template, status: StatusCode) -> Result<HttpResponse, AppError> {
    let body = tmpl.render()?;
    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// True when a database error is a unique-constraint violation.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn error_fragment(status: StatusCode, message: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{code}</title></head><body>\
         <div class=\"error\"><h1>{code} {reason}</h1><p>{message}</p></div></body></html>",
        code = status.as_u16(),
        reason = status.canonical_reason().unwrap_or(""),
        message = escape_html(message),
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
