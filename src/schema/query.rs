//! Query root: catalog reads and the caller's own data

use async_graphql::{Context, Object, ID};

use crate::authz::{principal, request_context, AuthGuard};
use crate::catalog::{self, parse_id};
use crate::pagination::PageInput;
use crate::types::{store, Book, Review, User};

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Books, optionally filtered by a title/author substring
    async fn get_books(
        &self,
        ctx: &Context<'_>,
        page: Option<i32>,
        limit: Option<i32>,
        search: Option<String>,
    ) -> async_graphql::Result<Vec<Book>> {
        let page = PageInput::new(page, limit);
        request_context(ctx)?.validate_input("PageInput", &page)?;
        Ok(catalog::list_books(store(ctx)?, page, search.as_deref()).await?)
    }

    async fn get_book(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Book> {
        let id = parse_id(&id, "book")?;
        Ok(catalog::book(store(ctx)?, id).await?)
    }

    async fn get_reviews(
        &self,
        ctx: &Context<'_>,
        book_id: ID,
        page: Option<i32>,
        limit: Option<i32>,
    ) -> async_graphql::Result<Vec<Review>> {
        let book_id = parse_id(&book_id, "book")?;
        let page = PageInput::new(page, limit);
        request_context(ctx)?.validate_input("PageInput", &page)?;
        Ok(catalog::list_reviews(store(ctx)?, book_id, page).await?)
    }

    /// Reviews written by the caller
    #[graphql(guard = "AuthGuard")]
    async fn get_my_reviews(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Review>> {
        let me = principal(ctx)?;
        Ok(catalog::reviews_by_user(store(ctx)?, me.id).await?)
    }

    /// The caller's own account
    #[graphql(guard = "AuthGuard")]
    async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<User> {
        Ok(User::from(principal(ctx)?))
    }
}
