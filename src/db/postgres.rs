use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    models::{
        Biodata, BiodataFields, BiodataFilter, BiodataType, ContactRequest, DeleteOutcome,
        Favorite, InsertOutcome, MemberStatus, NewFavorite, NewPayment, NewReview, NewUser,
        PremiumProfile, RequestedUser, Review, Role, SortOrder, UpdateOutcome, User,
    },
    Store,
};

const USER_COLUMNS: &str = "id, email, name, photo_url, role, status, created_at";
const JOINED_USER_COLUMNS: &str =
    "u.id, u.email, u.name, u.photo_url, u.role, u.status, u.created_at";
const BIODATA_COLUMNS: &str = "id, biodata_id, email, biodata_type, name, photo_url, \
    date_of_birth, height, weight, age, occupation, race, fathers_name, mothers_name, \
    permanent_division, present_division, expected_partner_age, expected_partner_height, \
    expected_partner_weight, mobile_number, created_at";
const FAVORITE_COLUMNS: &str =
    "id, customer_email, biodata_id, name, permanent_division, occupation, created_at";
const JOINED_PAYMENT_COLUMNS: &str =
    "p.id, p.email, p.price, p.biodata_id, p.transaction_id, p.name, p.created_at";
const REVIEW_COLUMNS: &str = "id, name, self_biodata_id, partner_biodata_id, couple_image, \
    review_star, success_story, marriage_date, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("find user")?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> anyhow::Result<User> {
        let inserted = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, name, photo_url, role, status)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.photo_url)
        .bind(Role::Customer)
        .bind(MemberStatus::Normal)
        .fetch_optional(&self.pool)
        .await
        .context("insert user")?;

        match inserted {
            Some(u) => Ok(u),
            None => self
                .find_user(&user.email)
                .await?
                .with_context(|| format!("user {} vanished after conflict", user.email)),
        }
    }

    async fn list_users_except(&self, email: &str) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email <> $1 ORDER BY created_at"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .context("list users")?;
        Ok(users)
    }

    async fn set_user_role(&self, email: &str, role: Role) -> anyhow::Result<UpdateOutcome> {
        let res = sqlx::query("UPDATE users SET role = $2 WHERE email = $1")
            .bind(email)
            .bind(role)
            .execute(&self.pool)
            .await
            .context("update user role")?;
        Ok(UpdateOutcome::new(res.rows_affected(), res.rows_affected()))
    }

    async fn set_user_status(
        &self,
        email: &str,
        status: MemberStatus,
    ) -> anyhow::Result<UpdateOutcome> {
        let res = sqlx::query("UPDATE users SET status = $2 WHERE email = $1")
            .bind(email)
            .bind(status)
            .execute(&self.pool)
            .await
            .context("update user status")?;
        Ok(UpdateOutcome::new(res.rows_affected(), res.rows_affected()))
    }

    async fn count_users_with_status(&self, status: MemberStatus) -> anyhow::Result<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .context("count users")?;
        Ok(n as u64)
    }

    async fn list_requested_users(&self) -> anyhow::Result<Vec<RequestedUser>> {
        let rows = sqlx::query_as::<_, RequestedUser>(&format!(
            r#"
            SELECT {JOINED_USER_COLUMNS}, b.biodata_id
            FROM users u
            LEFT JOIN biodata b ON b.email = u.email
            WHERE u.status = $1
            ORDER BY u.created_at
            "#
        ))
        .bind(MemberStatus::Requested)
        .fetch_all(&self.pool)
        .await
        .context("list requested users")?;
        Ok(rows)
    }

    async fn list_premium_profiles(
        &self,
        sort: Option<SortOrder>,
        limit: usize,
    ) -> anyhow::Result<Vec<PremiumProfile>> {
        let order = match sort {
            Some(SortOrder::Asc) => "b.age ASC NULLS FIRST, u.created_at",
            Some(SortOrder::Desc) => "b.age DESC NULLS LAST, u.created_at",
            None => "u.created_at",
        };
        let rows = sqlx::query_as::<_, PremiumProfile>(&format!(
            r#"
            SELECT {JOINED_USER_COLUMNS},
                   b.biodata_id,
                   b.photo_url AS biodata_image,
                   b.biodata_type,
                   b.permanent_division AS division,
                   b.occupation,
                   b.age AS biodata_age,
                   b.id AS biodata_record_id
            FROM users u
            LEFT JOIN biodata b ON b.email = u.email
            WHERE u.status = $1
            ORDER BY {order}
            LIMIT $2
            "#
        ))
        .bind(MemberStatus::Premium)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("list premium profiles")?;
        Ok(rows)
    }

    async fn find_biodata_by_email(&self, email: &str) -> anyhow::Result<Option<Biodata>> {
        let row = sqlx::query_as::<_, Biodata>(&format!(
            "SELECT {BIODATA_COLUMNS} FROM biodata WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("find biodata by email")?;
        Ok(row)
    }

    async fn find_biodata_by_id(&self, id: Uuid) -> anyhow::Result<Option<Biodata>> {
        let row = sqlx::query_as::<_, Biodata>(&format!(
            "SELECT {BIODATA_COLUMNS} FROM biodata WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("find biodata by id")?;
        Ok(row)
    }

    async fn max_biodata_id(&self) -> anyhow::Result<Option<i64>> {
        let max: Option<i64> = sqlx::query_scalar("SELECT MAX(biodata_id) FROM biodata")
            .fetch_one(&self.pool)
            .await
            .context("read max biodata id")?;
        Ok(max)
    }

    async fn insert_biodata(
        &self,
        email: &str,
        biodata_id: i64,
        f: BiodataFields,
    ) -> anyhow::Result<InsertOutcome> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO biodata (
                biodata_id, email, biodata_type, name, photo_url, date_of_birth, height,
                weight, age, occupation, race, fathers_name, mothers_name,
                permanent_division, present_division, expected_partner_age,
                expected_partner_height, expected_partner_weight, mobile_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING id
            "#,
        )
        .bind(biodata_id)
        .bind(email)
        .bind(f.biodata_type)
        .bind(f.name)
        .bind(f.photo_url)
        .bind(f.date_of_birth)
        .bind(f.height)
        .bind(f.weight)
        .bind(f.age)
        .bind(f.occupation)
        .bind(f.race)
        .bind(f.fathers_name)
        .bind(f.mothers_name)
        .bind(f.permanent_division)
        .bind(f.present_division)
        .bind(f.expected_partner_age)
        .bind(f.expected_partner_height)
        .bind(f.expected_partner_weight)
        .bind(f.mobile_number)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("insert biodata {biodata_id}"))?;
        Ok(InsertOutcome::new(id))
    }

    async fn update_biodata(
        &self,
        email: &str,
        f: BiodataFields,
    ) -> anyhow::Result<UpdateOutcome> {
        let res = sqlx::query(
            r#"
            UPDATE biodata SET
                biodata_type = COALESCE($2, biodata_type),
                name = COALESCE($3, name),
                photo_url = COALESCE($4, photo_url),
                date_of_birth = COALESCE($5, date_of_birth),
                height = COALESCE($6, height),
                weight = COALESCE($7, weight),
                age = COALESCE($8, age),
                occupation = COALESCE($9, occupation),
                race = COALESCE($10, race),
                fathers_name = COALESCE($11, fathers_name),
                mothers_name = COALESCE($12, mothers_name),
                permanent_division = COALESCE($13, permanent_division),
                present_division = COALESCE($14, present_division),
                expected_partner_age = COALESCE($15, expected_partner_age),
                expected_partner_height = COALESCE($16, expected_partner_height),
                expected_partner_weight = COALESCE($17, expected_partner_weight),
                mobile_number = COALESCE($18, mobile_number)
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(f.biodata_type)
        .bind(f.name)
        .bind(f.photo_url)
        .bind(f.date_of_birth)
        .bind(f.height)
        .bind(f.weight)
        .bind(f.age)
        .bind(f.occupation)
        .bind(f.race)
        .bind(f.fathers_name)
        .bind(f.mothers_name)
        .bind(f.permanent_division)
        .bind(f.present_division)
        .bind(f.expected_partner_age)
        .bind(f.expected_partner_height)
        .bind(f.expected_partner_weight)
        .bind(f.mobile_number)
        .execute(&self.pool)
        .await
        .context("update biodata")?;
        Ok(UpdateOutcome::new(res.rows_affected(), res.rows_affected()))
    }

    async fn search_biodata(&self, filter: &BiodataFilter) -> anyhow::Result<Vec<Biodata>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {BIODATA_COLUMNS} FROM biodata WHERE TRUE"
        ));
        if let Some(t) = filter.biodata_type {
            qb.push(" AND biodata_type = ").push_bind(t);
        }
        if let Some(division) = &filter.division {
            qb.push(" AND permanent_division = ").push_bind(division.clone());
        }
        if let Some(occupation) = &filter.occupation {
            qb.push(" AND occupation = ").push_bind(occupation.clone());
        }
        if let Some(min) = filter.min_age {
            qb.push(" AND age >= ").push_bind(min);
        }
        if let Some(max) = filter.max_age {
            qb.push(" AND age <= ").push_bind(max);
        }
        if let Some(needle) = &filter.name_contains {
            qb.push(" AND name ILIKE ")
                .push_bind(format!("%{}%", escape_like(needle)));
        }
        qb.push(" ORDER BY biodata_id");

        let rows = qb
            .build_query_as::<Biodata>()
            .fetch_all(&self.pool)
            .await
            .context("search biodata")?;
        Ok(rows)
    }

    async fn count_biodata(&self, biodata_type: Option<BiodataType>) -> anyhow::Result<u64> {
        let n: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM biodata WHERE $1::TEXT IS NULL OR biodata_type = $1",
        )
        .bind(biodata_type)
        .fetch_one(&self.pool)
        .await
        .context("count biodata")?;
        Ok(n as u64)
    }

    async fn insert_favorite(&self, fav: NewFavorite) -> anyhow::Result<InsertOutcome> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO favorites (customer_email, biodata_id, name, permanent_division, occupation)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(fav.customer_email)
        .bind(fav.biodata_id)
        .bind(fav.name)
        .bind(fav.permanent_division)
        .bind(fav.occupation)
        .fetch_one(&self.pool)
        .await
        .context("insert favorite")?;
        Ok(InsertOutcome::new(id))
    }

    async fn list_favorites(&self, customer_email: &str) -> anyhow::Result<Vec<Favorite>> {
        let rows = sqlx::query_as::<_, Favorite>(&format!(
            "SELECT {FAVORITE_COLUMNS} FROM favorites WHERE customer_email = $1 ORDER BY created_at"
        ))
        .bind(customer_email)
        .fetch_all(&self.pool)
        .await
        .context("list favorites")?;
        Ok(rows)
    }

    async fn delete_favorite(
        &self,
        id: Uuid,
        customer_email: &str,
    ) -> anyhow::Result<DeleteOutcome> {
        let res = sqlx::query("DELETE FROM favorites WHERE id = $1 AND customer_email = $2")
            .bind(id)
            .bind(customer_email)
            .execute(&self.pool)
            .await
            .context("delete favorite")?;
        Ok(DeleteOutcome::new(res.rows_affected()))
    }

    async fn insert_payment(&self, p: NewPayment) -> anyhow::Result<InsertOutcome> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO payments (email, price, biodata_id, transaction_id, name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(p.email)
        .bind(p.price)
        .bind(p.biodata_id)
        .bind(p.transaction_id)
        .bind(p.name)
        .fetch_one(&self.pool)
        .await
        .context("insert payment")?;
        Ok(InsertOutcome::new(id))
    }

    async fn list_contact_requests(&self, email: &str) -> anyhow::Result<Vec<ContactRequest>> {
        let rows = sqlx::query_as::<_, ContactRequest>(&format!(
            r#"
            SELECT {JOINED_PAYMENT_COLUMNS}, u.status AS user_status, u.name AS user_name
            FROM payments p
            JOIN users u ON u.email = p.email
            WHERE p.email = $1
            ORDER BY p.created_at
            "#
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .context("list contact requests")?;
        Ok(rows)
    }

    async fn delete_payment(&self, id: Uuid, email: &str) -> anyhow::Result<DeleteOutcome> {
        let res = sqlx::query("DELETE FROM payments WHERE id = $1 AND email = $2")
            .bind(id)
            .bind(email)
            .execute(&self.pool)
            .await
            .context("delete payment")?;
        Ok(DeleteOutcome::new(res.rows_affected()))
    }

    async fn total_revenue(&self) -> anyhow::Result<Option<f64>> {
        let total: Option<f64> = sqlx::query_scalar("SELECT SUM(price) FROM payments")
            .fetch_one(&self.pool)
            .await
            .context("sum payments")?;
        Ok(total)
    }

    async fn insert_review(&self, r: NewReview) -> anyhow::Result<InsertOutcome> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO reviews (
                name, self_biodata_id, partner_biodata_id, couple_image,
                review_star, success_story, marriage_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(r.name)
        .bind(r.self_biodata_id)
        .bind(r.partner_biodata_id)
        .bind(r.couple_image)
        .bind(r.review_star)
        .bind(r.success_story)
        .bind(r.marriage_date)
        .fetch_one(&self.pool)
        .await
        .context("insert review")?;
        Ok(InsertOutcome::new(id))
    }

    async fn list_reviews(&self, sort: Option<SortOrder>) -> anyhow::Result<Vec<Review>> {
        let order = match sort {
            Some(SortOrder::Asc) => "marriage_date ASC NULLS FIRST, created_at",
            Some(SortOrder::Desc) => "marriage_date DESC NULLS LAST, created_at",
            None => "created_at",
        };
        let rows = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY {order}"
        ))
        .fetch_all(&self.pool)
        .await
        .context("list reviews")?;
        Ok(rows)
    }

    async fn count_reviews(&self) -> anyhow::Result<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
            .fetch_one(&self.pool)
            .await
            .context("count reviews")?;
        Ok(n as u64)
    }
}
