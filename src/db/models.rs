use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Enums stored as plain TEXT columns and sent over the wire as the same strings.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => anyhow::bail!("invalid {} {:?}", stringify!($name), other),
                }
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(text.parse::<$name>()?)
            }
        }
    };
}

text_enum!(Role {
    Customer => "customer",
    Admin => "admin",
});

text_enum!(MemberStatus {
    Normal => "Normal",
    Requested => "Requested",
    Premium => "Premium",
});

text_enum!(BiodataType {
    Male => "Male",
    Female => "Female",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// `?sort=` on the listing routes. Blank values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct SortQuery {
    pub sort: Option<String>,
}

impl SortQuery {
    fn raw(&self) -> Option<&str> {
        self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// `asc` ascends, any other value descends.
    pub fn lenient(&self) -> Option<SortOrder> {
        self.raw()
            .map(|s| if s == "asc" { SortOrder::Asc } else { SortOrder::Desc })
    }

    /// Only `asc` and `dsc` sort; anything else keeps natural order.
    pub fn strict(&self) -> Option<SortOrder> {
        match self.raw()? {
            "asc" => Some(SortOrder::Asc),
            "dsc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

// ---- users ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub role: Role,
    pub status: MemberStatus,
    #[serde(rename = "timestamp", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
}

/// A user awaiting premium approval, with the id of their biodata when one exists.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RequestedUser {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub user: User,
    #[serde(rename = "biodataId", skip_serializing_if = "Option::is_none")]
    pub biodata_id: Option<i64>,
}

/// A premium user together with the highlights of their biodata.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PremiumProfile {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub user: User,
    pub biodata_id: Option<i64>,
    pub biodata_image: Option<String>,
    pub biodata_type: Option<BiodataType>,
    pub division: Option<String>,
    pub occupation: Option<String>,
    pub biodata_age: Option<i32>,
    #[serde(rename = "_idOfBiodata")]
    pub biodata_record_id: Option<Uuid>,
}

// ---- biodata ----

/// Editable biodata fields; `None` means "not provided" and leaves a stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BiodataFields {
    pub biodata_type: Option<BiodataType>,
    pub name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub date_of_birth: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub age: Option<i32>,
    pub occupation: Option<String>,
    pub race: Option<String>,
    pub fathers_name: Option<String>,
    pub mothers_name: Option<String>,
    pub permanent_division: Option<String>,
    pub present_division: Option<String>,
    pub expected_partner_age: Option<String>,
    pub expected_partner_height: Option<String>,
    pub expected_partner_weight: Option<String>,
    pub mobile_number: Option<String>,
}

impl BiodataFields {
    /// Overwrites every field `patch` provides. Returns whether anything changed.
    pub fn apply(&mut self, patch: &BiodataFields) -> bool {
        let before = self.clone();
        macro_rules! set {
            ($($field:ident),+) => {
                $(if let Some(v) = &patch.$field { self.$field = Some(v.clone()); })+
            };
        }
        set!(
            biodata_type,
            name,
            photo_url,
            date_of_birth,
            height,
            weight,
            age,
            occupation,
            race,
            fathers_name,
            mothers_name,
            permanent_division,
            present_division,
            expected_partner_age,
            expected_partner_height,
            expected_partner_weight,
            mobile_number
        );
        *self != before
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Biodata {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "bioDataId")]
    pub biodata_id: i64,
    pub email: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub fields: BiodataFields,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Filters of the public biodata search. Every present filter must match.
#[derive(Debug, Clone, Default)]
pub struct BiodataFilter {
    pub biodata_type: Option<BiodataType>,
    pub division: Option<String>,
    pub occupation: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub name_contains: Option<String>,
}

impl BiodataFilter {
    pub fn matches(&self, b: &Biodata) -> bool {
        let f = &b.fields;
        if self.biodata_type.is_some() && f.biodata_type != self.biodata_type {
            return false;
        }
        if self.division.is_some() && f.permanent_division != self.division {
            return false;
        }
        if self.occupation.is_some() && f.occupation != self.occupation {
            return false;
        }
        if let Some(min) = self.min_age {
            if !f.age.is_some_and(|age| age >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_age {
            if !f.age.is_some_and(|age| age <= max) {
                return false;
            }
        }
        if let Some(needle) = &self.name_contains {
            let needle = needle.to_lowercase();
            if !f
                .name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }
}

// ---- favorites ----

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub customer_email: String,
    pub biodata_id: i64,
    pub name: Option<String>,
    pub permanent_division: Option<String>,
    pub occupation: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewFavorite {
    pub customer_email: String,
    pub biodata_id: i64,
    pub name: Option<String>,
    pub permanent_division: Option<String>,
    pub occupation: Option<String>,
}

// ---- payments ----

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub price: f64,
    pub biodata_id: Option<i64>,
    pub transaction_id: Option<String>,
    pub name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub email: String,
    pub price: f64,
    pub biodata_id: Option<i64>,
    pub transaction_id: Option<String>,
    pub name: Option<String>,
}

/// A contact request joined with the payer's account.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub payment: Payment,
    pub user_status: MemberStatus,
    pub user_name: Option<String>,
}

// ---- reviews ----

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: Option<String>,
    pub self_biodata_id: Option<i64>,
    pub partner_biodata_id: Option<i64>,
    pub couple_image: Option<String>,
    pub review_star: Option<i32>,
    pub success_story: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub marriage_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct NewReview {
    pub name: Option<String>,
    pub self_biodata_id: Option<i64>,
    pub partner_biodata_id: Option<i64>,
    pub couple_image: Option<String>,
    pub review_star: Option<i32>,
    pub success_story: Option<String>,
    pub marriage_date: Option<OffsetDateTime>,
}

// ---- write acknowledgements ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

impl InsertOutcome {
    pub fn new(inserted_id: Uuid) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateOutcome {
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count,
            modified_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteOutcome {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}
