use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    models::{
        Biodata, BiodataFields, BiodataFilter, BiodataType, ContactRequest, DeleteOutcome,
        Favorite, InsertOutcome, MemberStatus, NewFavorite, NewPayment, NewReview, NewUser,
        Payment, PremiumProfile, RequestedUser, Review, Role, SortOrder, UpdateOutcome, User,
    },
    Store,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    biodata: Vec<Biodata>,
    favorites: Vec<Favorite>,
    payments: Vec<Payment>,
    reviews: Vec<Review>,
}

impl Tables {
    fn biodata_for(&self, email: &str) -> Option<&Biodata> {
        self.biodata.iter().find(|b| b.email == email)
    }
}

/// In-process `Store`. Rows live in insertion order, which is also the natural order
/// listings fall back to.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_sort<T: PartialOrd>(sort: SortOrder, a: &T, b: &T) -> std::cmp::Ordering {
    let ord = a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal);
    match sort {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, email: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> anyhow::Result<User> {
        let mut t = self.tables.write().await;
        if let Some(existing) = t.users.iter().find(|u| u.email == user.email) {
            return Ok(existing.clone());
        }
        let record = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            photo_url: user.photo_url,
            role: Role::Customer,
            status: MemberStatus::Normal,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(record.clone());
        Ok(record)
    }

    async fn list_users_except(&self, email: &str) -> anyhow::Result<Vec<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().filter(|u| u.email != email).cloned().collect())
    }

    async fn set_user_role(&self, email: &str, role: Role) -> anyhow::Result<UpdateOutcome> {
        let mut t = self.tables.write().await;
        Ok(match t.users.iter_mut().find(|u| u.email == email) {
            Some(u) => {
                let modified = u.role != role;
                u.role = role;
                UpdateOutcome::new(1, modified as u64)
            }
            None => UpdateOutcome::new(0, 0),
        })
    }

    async fn set_user_status(
        &self,
        email: &str,
        status: MemberStatus,
    ) -> anyhow::Result<UpdateOutcome> {
        let mut t = self.tables.write().await;
        Ok(match t.users.iter_mut().find(|u| u.email == email) {
            Some(u) => {
                let modified = u.status != status;
                u.status = status;
                UpdateOutcome::new(1, modified as u64)
            }
            None => UpdateOutcome::new(0, 0),
        })
    }

    async fn count_users_with_status(&self, status: MemberStatus) -> anyhow::Result<u64> {
        let t = self.tables.read().await;
        Ok(t.users.iter().filter(|u| u.status == status).count() as u64)
    }

    async fn list_requested_users(&self) -> anyhow::Result<Vec<RequestedUser>> {
        let t = self.tables.read().await;
        Ok(t.users
            .iter()
            .filter(|u| u.status == MemberStatus::Requested)
            .map(|u| RequestedUser {
                user: u.clone(),
                biodata_id: t.biodata_for(&u.email).map(|b| b.biodata_id),
            })
            .collect())
    }

    async fn list_premium_profiles(
        &self,
        sort: Option<SortOrder>,
        limit: usize,
    ) -> anyhow::Result<Vec<PremiumProfile>> {
        let t = self.tables.read().await;
        let mut profiles: Vec<PremiumProfile> = t
            .users
            .iter()
            .filter(|u| u.status == MemberStatus::Premium)
            .map(|u| {
                let bio = t.biodata_for(&u.email);
                PremiumProfile {
                    user: u.clone(),
                    biodata_id: bio.map(|b| b.biodata_id),
                    biodata_image: bio.and_then(|b| b.fields.photo_url.clone()),
                    biodata_type: bio.and_then(|b| b.fields.biodata_type),
                    division: bio.and_then(|b| b.fields.permanent_division.clone()),
                    occupation: bio.and_then(|b| b.fields.occupation.clone()),
                    biodata_age: bio.and_then(|b| b.fields.age),
                    biodata_record_id: bio.map(|b| b.id),
                }
            })
            .collect();
        if let Some(sort) = sort {
            profiles.sort_by(|a, b| by_sort(sort, &a.biodata_age, &b.biodata_age));
        }
        profiles.truncate(limit);
        Ok(profiles)
    }

    async fn find_biodata_by_email(&self, email: &str) -> anyhow::Result<Option<Biodata>> {
        let t = self.tables.read().await;
        Ok(t.biodata_for(email).cloned())
    }

    async fn find_biodata_by_id(&self, id: Uuid) -> anyhow::Result<Option<Biodata>> {
        let t = self.tables.read().await;
        Ok(t.biodata.iter().find(|b| b.id == id).cloned())
    }

    async fn max_biodata_id(&self) -> anyhow::Result<Option<i64>> {
        let t = self.tables.read().await;
        Ok(t.biodata.iter().map(|b| b.biodata_id).max())
    }

    async fn insert_biodata(
        &self,
        email: &str,
        biodata_id: i64,
        fields: BiodataFields,
    ) -> anyhow::Result<InsertOutcome> {
        let mut t = self.tables.write().await;
        if t.biodata.iter().any(|b| b.biodata_id == biodata_id) {
            anyhow::bail!("biodata id {biodata_id} is already assigned");
        }
        if t.biodata_for(email).is_some() {
            anyhow::bail!("biodata for {email} already exists");
        }
        let id = Uuid::new_v4();
        t.biodata.push(Biodata {
            id,
            biodata_id,
            email: email.to_string(),
            fields,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(InsertOutcome::new(id))
    }

    async fn update_biodata(
        &self,
        email: &str,
        fields: BiodataFields,
    ) -> anyhow::Result<UpdateOutcome> {
        let mut t = self.tables.write().await;
        Ok(match t.biodata.iter_mut().find(|b| b.email == email) {
            Some(b) => {
                let modified = b.fields.apply(&fields);
                UpdateOutcome::new(1, modified as u64)
            }
            None => UpdateOutcome::new(0, 0),
        })
    }

    async fn search_biodata(&self, filter: &BiodataFilter) -> anyhow::Result<Vec<Biodata>> {
        let t = self.tables.read().await;
        let mut found: Vec<Biodata> = t
            .biodata
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        found.sort_by_key(|b| b.biodata_id);
        Ok(found)
    }

    async fn count_biodata(&self, biodata_type: Option<BiodataType>) -> anyhow::Result<u64> {
        let t = self.tables.read().await;
        Ok(t.biodata
            .iter()
            .filter(|b| biodata_type.is_none() || b.fields.biodata_type == biodata_type)
            .count() as u64)
    }

    async fn insert_favorite(&self, favorite: NewFavorite) -> anyhow::Result<InsertOutcome> {
        let mut t = self.tables.write().await;
        let id = Uuid::new_v4();
        t.favorites.push(Favorite {
            id,
            customer_email: favorite.customer_email,
            biodata_id: favorite.biodata_id,
            name: favorite.name,
            permanent_division: favorite.permanent_division,
            occupation: favorite.occupation,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(InsertOutcome::new(id))
    }

    async fn list_favorites(&self, customer_email: &str) -> anyhow::Result<Vec<Favorite>> {
        let t = self.tables.read().await;
        Ok(t.favorites
            .iter()
            .filter(|f| f.customer_email == customer_email)
            .cloned()
            .collect())
    }

    async fn delete_favorite(
        &self,
        id: Uuid,
        customer_email: &str,
    ) -> anyhow::Result<DeleteOutcome> {
        let mut t = self.tables.write().await;
        let before = t.favorites.len();
        t.favorites
            .retain(|f| !(f.id == id && f.customer_email == customer_email));
        Ok(DeleteOutcome::new((before - t.favorites.len()) as u64))
    }

    async fn insert_payment(&self, payment: NewPayment) -> anyhow::Result<InsertOutcome> {
        let mut t = self.tables.write().await;
        let id = Uuid::new_v4();
        t.payments.push(Payment {
            id,
            email: payment.email,
            price: payment.price,
            biodata_id: payment.biodata_id,
            transaction_id: payment.transaction_id,
            name: payment.name,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(InsertOutcome::new(id))
    }

    async fn list_contact_requests(&self, email: &str) -> anyhow::Result<Vec<ContactRequest>> {
        let t = self.tables.read().await;
        let Some(payer) = t.users.iter().find(|u| u.email == email) else {
            return Ok(Vec::new());
        };
        Ok(t.payments
            .iter()
            .filter(|p| p.email == email)
            .map(|p| ContactRequest {
                payment: p.clone(),
                user_status: payer.status,
                user_name: payer.name.clone(),
            })
            .collect())
    }

    async fn delete_payment(&self, id: Uuid, email: &str) -> anyhow::Result<DeleteOutcome> {
        let mut t = self.tables.write().await;
        let before = t.payments.len();
        t.payments.retain(|p| !(p.id == id && p.email == email));
        Ok(DeleteOutcome::new((before - t.payments.len()) as u64))
    }

    async fn total_revenue(&self) -> anyhow::Result<Option<f64>> {
        let t = self.tables.read().await;
        if t.payments.is_empty() {
            return Ok(None);
        }
        Ok(Some(t.payments.iter().map(|p| p.price).sum()))
    }

    async fn insert_review(&self, review: NewReview) -> anyhow::Result<InsertOutcome> {
        let mut t = self.tables.write().await;
        let id = Uuid::new_v4();
        t.reviews.push(Review {
            id,
            name: review.name,
            self_biodata_id: review.self_biodata_id,
            partner_biodata_id: review.partner_biodata_id,
            couple_image: review.couple_image,
            review_star: review.review_star,
            success_story: review.success_story,
            marriage_date: review.marriage_date,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(InsertOutcome::new(id))
    }

    async fn list_reviews(&self, sort: Option<SortOrder>) -> anyhow::Result<Vec<Review>> {
        let t = self.tables.read().await;
        let mut reviews = t.reviews.clone();
        if let Some(sort) = sort {
            reviews.sort_by(|a, b| by_sort(sort, &a.marriage_date, &b.marriage_date));
        }
        Ok(reviews)
    }

    async fn count_reviews(&self) -> anyhow::Result<u64> {
        Ok(self.tables.read().await.reviews.len() as u64)
    }
}
