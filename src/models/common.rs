use chrono::NaiveDate;
use serde::Deserialize;

// Query parameters for date-scoped endpoints
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

// Header carrying the authenticated patient's email, set by the upstream auth gateway
pub const USER_EMAIL_HEADER: &str = "x-user-email";
