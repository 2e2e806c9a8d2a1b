use serde::{Deserialize, Serialize};

use crate::{
    db::models::{BiodataFilter, InsertOutcome, UpdateOutcome},
    error::AppError,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiodataUpdated {
    pub message: &'static str,
    pub update_result: UpdateOutcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiodataCreated {
    pub message: &'static str,
    pub insert_result: InsertOutcome,
}

/// Raw search parameters. The web client sends empty strings for unset filters, so
/// everything arrives as text and blanks are dropped before parsing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiodataQuery {
    pub biodata_type: Option<String>,
    pub division: Option<String>,
    pub occupation: Option<String>,
    pub mini_age: Option<String>,
    pub max_age: Option<String>,
    pub search: Option<String>,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_age(name: &str, v: Option<String>) -> Result<Option<i32>, AppError> {
    non_empty(v)
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| AppError::BadRequest(format!("{name} must be a whole number")))
        })
        .transpose()
}

impl BiodataQuery {
    pub fn into_filter(self) -> Result<BiodataFilter, AppError> {
        let biodata_type = non_empty(self.biodata_type)
            .map(|s| s.parse().map_err(|e: anyhow::Error| AppError::BadRequest(e.to_string())))
            .transpose()?;
        Ok(BiodataFilter {
            biodata_type,
            division: non_empty(self.division),
            occupation: non_empty(self.occupation),
            min_age: parse_age("miniAge", self.mini_age)?,
            max_age: parse_age("maxAge", self.max_age)?,
            name_contains: non_empty(self.search),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::BiodataType;

    #[test]
    fn blank_filters_are_ignored() {
        let filter = BiodataQuery {
            biodata_type: Some("".into()),
            division: Some("  ".into()),
            mini_age: Some("".into()),
            search: Some("ra".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.biodata_type, None);
        assert_eq!(filter.division, None);
        assert_eq!(filter.min_age, None);
        assert_eq!(filter.name_contains.as_deref(), Some("ra"));
    }

    #[test]
    fn typed_filters_are_parsed() {
        let filter = BiodataQuery {
            biodata_type: Some("Female".into()),
            mini_age: Some("21".into()),
            max_age: Some("30".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.biodata_type, Some(BiodataType::Female));
        assert_eq!((filter.min_age, filter.max_age), (Some(21), Some(30)));
    }

    #[test]
    fn bad_age_is_a_bad_request() {
        let err = BiodataQuery {
            max_age: Some("old".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(m) if m.contains("maxAge")));
    }
}
