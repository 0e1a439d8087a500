//! Data store collaborator
//!
//! The API treats persistence as simple keyed CRUD calls behind [`Store`].
//! [`MemoryStore`] is the in-process implementation used by the binary and tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Store failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A unique attribute is already taken
    #[error("duplicate {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub published_year: i32,
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub published_year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub rating: i32,
    pub comment: String,
}

/// Partial update of a review; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct ReviewChanges {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

/// Persistence operations the API relies on
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<UserRecord>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> StoreResult<Option<UserRecord>>;

    async fn create_user(&self, user: NewUser) -> StoreResult<UserRecord>;

    /// Books whose title or author contains `search` (case-insensitive)
    async fn list_books(
        &self,
        search: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<BookRecord>>;

    async fn find_book(&self, id: Uuid) -> StoreResult<Option<BookRecord>>;

    async fn create_book(&self, book: NewBook) -> StoreResult<BookRecord>;

    async fn list_reviews_for_book(
        &self,
        book_id: Uuid,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<ReviewRecord>>;

    async fn list_reviews_by_user(&self, user_id: Uuid) -> StoreResult<Vec<ReviewRecord>>;

    async fn find_review(&self, id: Uuid) -> StoreResult<Option<ReviewRecord>>;

    async fn create_review(&self, review: NewReview) -> StoreResult<ReviewRecord>;

    /// Apply `changes`; `None` when the review does not exist
    async fn update_review(
        &self,
        id: Uuid,
        changes: ReviewChanges,
    ) -> StoreResult<Option<ReviewRecord>>;

    /// Remove and return the review; `None` when it does not exist
    async fn delete_review(&self, id: Uuid) -> StoreResult<Option<ReviewRecord>>;
}

/// Shared store handle passed to the schema and identity resolver
pub type SharedStore = Arc<dyn Store>;

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    books: Vec<BookRecord>,
    reviews: Vec<ReviewRecord>,
}

/// In-memory store, rows kept in insertion order
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> StoreResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email == email || u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("username".to_string()));
        }
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email".to_string()));
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.push(record.clone());
        Ok(record)
    }

    async fn list_books(
        &self,
        search: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<BookRecord>> {
        let tables = self.tables.read().await;
        let needle = search.map(str::to_lowercase).filter(|s| !s.is_empty());

        Ok(tables
            .books
            .iter()
            .filter(|b| match &needle {
                Some(n) => contains_ignore_case(&b.title, n) || contains_ignore_case(&b.author, n),
                None => true,
            })
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_book(&self, id: Uuid) -> StoreResult<Option<BookRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.books.iter().find(|b| b.id == id).cloned())
    }

    async fn create_book(&self, book: NewBook) -> StoreResult<BookRecord> {
        let record = BookRecord {
            id: Uuid::new_v4(),
            title: book.title,
            author: book.author,
            published_year: book.published_year,
        };
        self.tables.write().await.books.push(record.clone());
        Ok(record)
    }

    async fn list_reviews_for_book(
        &self,
        book_id: Uuid,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<ReviewRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .iter()
            .filter(|r| r.book_id == book_id)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_reviews_by_user(&self, user_id: Uuid) -> StoreResult<Vec<ReviewRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_review(&self, id: Uuid) -> StoreResult<Option<ReviewRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn create_review(&self, review: NewReview) -> StoreResult<ReviewRecord> {
        let record = ReviewRecord {
            id: Uuid::new_v4(),
            user_id: review.user_id,
            book_id: review.book_id,
            rating: review.rating,
            comment: review.comment,
            created_at: Utc::now(),
        };
        self.tables.write().await.reviews.push(record.clone());
        Ok(record)
    }

    async fn update_review(
        &self,
        id: Uuid,
        changes: ReviewChanges,
    ) -> StoreResult<Option<ReviewRecord>> {
        let mut tables = self.tables.write().await;
        let Some(review) = tables.reviews.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        if let Some(rating) = changes.rating {
            review.rating = rating;
        }
        if let Some(comment) = changes.comment {
            review.comment = comment;
        }
        Ok(Some(review.clone()))
    }

    async fn delete_review(&self, id: Uuid) -> StoreResult<Option<ReviewRecord>> {
        let mut tables = self.tables.write().await;
        let position = tables.reviews.iter().position(|r| r.id == id);
        Ok(position.map(|idx| tables.reviews.remove(idx)))
    }
}
