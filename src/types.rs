//! GraphQL object types

use async_graphql::{Context, Object, Scalar, ScalarType, SimpleObject, Value, ID};
use chrono::{DateTime as ChronoDateTime, Utc};
use uuid::Uuid;

use crate::catalog;
use crate::identity::Principal;
use crate::store::{BookRecord, ReviewRecord, SharedStore, UserRecord};

/// RFC 3339 timestamp scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime(pub ChronoDateTime<Utc>);

#[Scalar]
impl ScalarType for DateTime {
    fn parse(value: Value) -> async_graphql::InputValueResult<Self> {
        if let Value::String(s) = value {
            Ok(DateTime(
                ChronoDateTime::parse_from_rfc3339(&s)
                    .map_err(|e| format!("Invalid DateTime: {}", e))?
                    .with_timezone(&Utc),
            ))
        } else {
            Err("Expected string for DateTime".into())
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.0.to_rfc3339())
    }
}

pub(crate) fn store<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a SharedStore> {
    ctx.data::<SharedStore>()
}

fn to_id(uuid: Uuid) -> ID {
    ID(uuid.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[Object]
impl User {
    async fn id(&self) -> ID {
        to_id(self.id)
    }

    async fn username(&self) -> &str {
        &self.username
    }

    async fn email(&self) -> &str {
        &self.email
    }

    async fn reviews(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Review>> {
        Ok(catalog::reviews_by_user(store(ctx)?, self.id).await?)
    }
}

impl From<UserRecord> for User {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

impl From<&Principal> for User {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            username: principal.username.clone(),
            email: principal.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book(pub BookRecord);

#[Object]
impl Book {
    async fn id(&self) -> ID {
        to_id(self.0.id)
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn author(&self) -> &str {
        &self.0.author
    }

    async fn published_year(&self) -> i32 {
        self.0.published_year
    }

    async fn reviews(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Review>> {
        Ok(catalog::reviews_for_book(store(ctx)?, self.0.id).await?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review(pub ReviewRecord);

#[Object]
impl Review {
    async fn id(&self) -> ID {
        to_id(self.0.id)
    }

    async fn user(&self, ctx: &Context<'_>) -> async_graphql::Result<User> {
        Ok(catalog::user(store(ctx)?, self.0.user_id).await?)
    }

    async fn book(&self, ctx: &Context<'_>) -> async_graphql::Result<Book> {
        Ok(catalog::book(store(ctx)?, self.0.book_id).await?)
    }

    async fn rating(&self) -> i32 {
        self.0.rating
    }

    async fn comment(&self) -> &str {
        &self.0.comment
    }

    async fn created_at(&self) -> DateTime {
        DateTime(self.0.created_at)
    }
}

/// Result of register, login and refreshToken
#[derive(SimpleObject, Debug, Clone)]
pub struct AuthPayload {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}
