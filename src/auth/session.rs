use actix_session::Session;

use crate::errors::AppError;
use crate::models::user::User;

const USER_ID_KEY: &str = "user_id";
const FLASH_KEY: &str = "flash";

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>(USER_ID_KEY).unwrap_or(None)
}

/// Start an authenticated session for `user`. The session is renewed to
/// prevent fixation.
pub fn log_in(session: &Session, user: &User) -> Result<(), AppError> {
    session.renew();
    session
        .insert(USER_ID_KEY, user.id)
        .map_err(|e| AppError::Session(format!("Failed to store session: {e}")))
}

pub fn log_out(session: &Session) {
    session.purge();
}

pub fn set_flash(session: &Session, message: impl Into<String>) {
    let _ = session.insert(FLASH_KEY, message.into());
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>(FLASH_KEY).unwrap_or(None);
    if flash.is_some() {
        session.remove(FLASH_KEY);
    }
    flash
}
