use serde::Deserialize;
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};

use crate::{db::models::NewReview, error::AppError};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub name: Option<String>,
    pub self_biodata_id: Option<i64>,
    pub partner_biodata_id: Option<i64>,
    pub couple_image: Option<String>,
    pub review_star: Option<i32>,
    pub success_story: Option<String>,
    /// RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
    pub marriage_date: Option<String>,
}

/// Bare dates are taken as midnight UTC.
pub fn parse_marriage_date(raw: &str) -> Result<OffsetDateTime, AppError> {
    let raw = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(ts);
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map(|d| d.midnight().assume_utc())
        .map_err(|_| AppError::BadRequest(format!("invalid marriageDate: {raw}")))
}

impl ReviewRequest {
    pub fn into_new_review(self) -> Result<NewReview, AppError> {
        let marriage_date = match self.marriage_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_marriage_date(raw)?),
        };
        if let Some(star) = self.review_star {
            if !(0..=5).contains(&star) {
                return Err(AppError::BadRequest("reviewStar must be between 0 and 5".into()));
            }
        }
        Ok(NewReview {
            name: self.name,
            self_biodata_id: self.self_biodata_id,
            partner_biodata_id: self.partner_biodata_id,
            couple_image: self.couple_image,
            review_star: self.review_star,
            success_story: self.success_story,
            marriage_date,
        })
    }
}
