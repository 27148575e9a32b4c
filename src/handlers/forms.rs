//! Helpers shared by the HTML form handlers.

use actix_web::HttpResponse;
use chrono::NaiveDateTime;

use crate::templates_structs::SelectOption;
use crate::models::user::UserDisplay;

/// Accepted `datetime-local` shapes, with and without seconds.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Raw `application/x-www-form-urlencoded` fields in submission order.
/// Unlike a typed form, repeated keys (multi-selects) are kept.
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// First value for `key`, or "" when absent.
    pub fn get(&self, key: &str) -> &str {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn csrf_token(&self) -> &str {
        self.get("csrf_token")
    }

    /// Every non-empty value for `key` parsed as an id, de-duplicated in
    /// submission order.
    pub fn ids(&self, key: &str) -> Result<Vec<i64>, String> {
        let mut out = Vec::new();
        for (_, raw) in self.0.iter().filter(|(k, v)| k == key && !v.trim().is_empty()) {
            let id = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("Invalid user id '{raw}'"))?;
            if !out.contains(&id) {
                out.push(id);
            }
        }
        Ok(out)
    }

    /// Optional single id; empty means `None`.
    pub fn optional_id(&self, key: &str) -> Result<Option<i64>, String> {
        let raw = self.get(key).trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<i64>()
            .map(Some)
            .map_err(|_| format!("Invalid id '{raw}'"))
    }
}

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Value for an `<input type="datetime-local">`.
pub fn datetime_input(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M").to_string()
}

/// Checkbox options for a user picker.
pub fn user_options(users: &[UserDisplay], selected: &[i64]) -> Vec<SelectOption> {
    users
        .iter()
        .map(|u| SelectOption::new(u.id, format!("{} ({})", u.name, u.email), selected.contains(&u.id)))
        .collect()
}

pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        FormFields::new(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn repeated_keys_become_id_list() {
        let f = fields(&[("title", "x"), ("user_ids", "3"), ("user_ids", "1"), ("user_ids", "3"), ("user_ids", "")]);
        assert_eq!(f.ids("user_ids").unwrap(), vec![3, 1]);
        assert_eq!(f.get("title"), "x");
        assert_eq!(f.get("missing"), "");
    }

    #[test]
    fn bad_id_is_reported() {
        let f = fields(&[("user_ids", "abc")]);
        assert!(f.ids("user_ids").unwrap_err().contains("abc"));
        assert_eq!(fields(&[("manager_id", "")]).optional_id("manager_id").unwrap(), None);
        assert_eq!(fields(&[("manager_id", "7")]).optional_id("manager_id").unwrap(), Some(7));
    }

    #[test]
    fn datetime_local_formats() {
        let a = parse_datetime("2026-03-01T09:30").unwrap();
        let b = parse_datetime("2026-03-01T09:30:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(datetime_input(&a), "2026-03-01T09:30");
        assert!(parse_datetime("01/03/2026").is_none());
    }
}
