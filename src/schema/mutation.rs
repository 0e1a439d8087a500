//! Mutation root: account flows and catalog writes

use std::sync::Arc;

use async_graphql::{Context, Object, ID};

use crate::accounts;
use crate::authz::{principal, request_context, AuthGuard};
use crate::catalog::{self, parse_id};
use crate::token::TokenService;
use crate::types::{store, AuthPayload, Book, Review};
use crate::validation::{AddBookInput, AddReviewInput, RegisterInput, UpdateReviewInput};

fn tokens<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Arc<TokenService>> {
    ctx.data::<Arc<TokenService>>()
}

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn register(
        &self,
        ctx: &Context<'_>,
        username: String,
        email: String,
        password: String,
    ) -> async_graphql::Result<AuthPayload> {
        let input = RegisterInput {
            username,
            email,
            password,
        };
        Ok(accounts::register(store(ctx)?, tokens(ctx)?, request_context(ctx)?, input).await?)
    }

    async fn login(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> async_graphql::Result<AuthPayload> {
        Ok(accounts::login(store(ctx)?, tokens(ctx)?, &email, &password).await?)
    }

    /// Trade a refresh token for a new access/refresh pair
    async fn refresh_token(
        &self,
        ctx: &Context<'_>,
        token: String,
    ) -> async_graphql::Result<AuthPayload> {
        Ok(accounts::refresh(store(ctx)?, tokens(ctx)?, &token).await?)
    }

    #[graphql(guard = "AuthGuard")]
    async fn add_book(
        &self,
        ctx: &Context<'_>,
        title: String,
        author: String,
        published_year: i32,
    ) -> async_graphql::Result<Book> {
        let input = AddBookInput {
            title,
            author,
            published_year,
        };
        request_context(ctx)?.validate_input("AddBookInput", &input)?;
        Ok(catalog::add_book(store(ctx)?, input).await?)
    }

    #[graphql(guard = "AuthGuard")]
    async fn add_review(
        &self,
        ctx: &Context<'_>,
        book_id: ID,
        rating: i32,
        comment: String,
    ) -> async_graphql::Result<Review> {
        let book_id = parse_id(&book_id, "book")?;
        let input = AddReviewInput { rating, comment };
        request_context(ctx)?.validate_input("AddReviewInput", &input)?;
        Ok(catalog::add_review(store(ctx)?, principal(ctx)?, book_id, input).await?)
    }

    /// Change rating and/or comment of the caller's own review
    #[graphql(guard = "AuthGuard")]
    async fn update_review(
        &self,
        ctx: &Context<'_>,
        review_id: ID,
        rating: Option<i32>,
        comment: Option<String>,
    ) -> async_graphql::Result<Review> {
        let review_id = parse_id(&review_id, "review")?;
        let input = UpdateReviewInput { rating, comment };
        request_context(ctx)?.validate_input("UpdateReviewInput", &input)?;
        Ok(catalog::update_review(store(ctx)?, principal(ctx)?, review_id, input).await?)
    }

    #[graphql(guard = "AuthGuard")]
    async fn delete_review(
        &self,
        ctx: &Context<'_>,
        review_id: ID,
    ) -> async_graphql::Result<Review> {
        let review_id = parse_id(&review_id, "review")?;
        Ok(catalog::delete_review(store(ctx)?, principal(ctx)?, review_id).await?)
    }
}
