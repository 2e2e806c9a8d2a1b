mod memory;
pub mod models;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use models::{
    Biodata, BiodataFields, BiodataFilter, BiodataType, ContactRequest, DeleteOutcome, Favorite,
    InsertOutcome, MemberStatus, NewFavorite, NewPayment, NewReview, NewUser, PremiumProfile,
    RequestedUser, Review, Role, SortOrder, UpdateOutcome, User,
};

/// Every storage operation the HTTP handlers issue. One call per handler step; no
/// implementation retries or spans several calls in a transaction.
#[async_trait]
pub trait Store: Send + Sync {
    // users
    async fn find_user(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// Inserts the user with role `customer` and status `Normal`, or returns the
    /// existing record when the email is already taken.
    async fn insert_user(&self, user: NewUser) -> anyhow::Result<User>;
    async fn list_users_except(&self, email: &str) -> anyhow::Result<Vec<User>>;
    async fn set_user_role(&self, email: &str, role: Role) -> anyhow::Result<UpdateOutcome>;
    async fn set_user_status(
        &self,
        email: &str,
        status: MemberStatus,
    ) -> anyhow::Result<UpdateOutcome>;
    async fn count_users_with_status(&self, status: MemberStatus) -> anyhow::Result<u64>;
    async fn list_requested_users(&self) -> anyhow::Result<Vec<RequestedUser>>;
    async fn list_premium_profiles(
        &self,
        sort: Option<SortOrder>,
        limit: usize,
    ) -> anyhow::Result<Vec<PremiumProfile>>;

    // biodata
    async fn find_biodata_by_email(&self, email: &str) -> anyhow::Result<Option<Biodata>>;
    async fn find_biodata_by_id(&self, id: Uuid) -> anyhow::Result<Option<Biodata>>;
    /// Highest assigned biodata id, `None` while the collection is empty.
    async fn max_biodata_id(&self) -> anyhow::Result<Option<i64>>;
    async fn insert_biodata(
        &self,
        email: &str,
        biodata_id: i64,
        fields: BiodataFields,
    ) -> anyhow::Result<InsertOutcome>;
    async fn update_biodata(
        &self,
        email: &str,
        fields: BiodataFields,
    ) -> anyhow::Result<UpdateOutcome>;
    async fn search_biodata(&self, filter: &BiodataFilter) -> anyhow::Result<Vec<Biodata>>;
    async fn count_biodata(&self, biodata_type: Option<BiodataType>) -> anyhow::Result<u64>;

    // favorites
    async fn insert_favorite(&self, favorite: NewFavorite) -> anyhow::Result<InsertOutcome>;
    async fn list_favorites(&self, customer_email: &str) -> anyhow::Result<Vec<Favorite>>;
    async fn delete_favorite(&self, id: Uuid, customer_email: &str)
        -> anyhow::Result<DeleteOutcome>;

    // payments
    async fn insert_payment(&self, payment: NewPayment) -> anyhow::Result<InsertOutcome>;
    async fn list_contact_requests(&self, email: &str) -> anyhow::Result<Vec<ContactRequest>>;
    async fn delete_payment(&self, id: Uuid, email: &str) -> anyhow::Result<DeleteOutcome>;
    /// Sum of all payment prices, `None` when no payment exists.
    async fn total_revenue(&self) -> anyhow::Result<Option<f64>>;

    // reviews
    async fn insert_review(&self, review: NewReview) -> anyhow::Result<InsertOutcome>;
    async fn list_reviews(&self, sort: Option<SortOrder>) -> anyhow::Result<Vec<Review>>;
    async fn count_reviews(&self) -> anyhow::Result<u64>;
}
