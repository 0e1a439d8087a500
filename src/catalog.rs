//! Book and review operations behind the catalog fields

use async_graphql::ID;
use uuid::Uuid;

use crate::authz::ensure_owner;
use crate::error::{AppError, AppResult};
use crate::identity::Principal;
use crate::pagination::PageInput;
use crate::store::{NewBook, NewReview, ReviewChanges, SharedStore};
use crate::types::{Book, Review, User};
use crate::validation::{AddBookInput, AddReviewInput, UpdateReviewInput};

/// Parse a GraphQL `ID` into a store key
pub fn parse_id(id: &ID, what: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id.as_str())
        .map_err(|_| AppError::Validation(format!("Validation failed: invalid {} id", what)))
}

pub async fn list_books(
    store: &SharedStore,
    page: PageInput,
    search: Option<&str>,
) -> AppResult<Vec<Book>> {
    let books = store.list_books(search, page.offset(), page.limit()).await?;
    Ok(books.into_iter().map(Book).collect())
}

pub async fn book(store: &SharedStore, id: Uuid) -> AppResult<Book> {
    store
        .find_book(id)
        .await?
        .map(Book)
        .ok_or_else(|| AppError::not_found("book"))
}

pub async fn user(store: &SharedStore, id: Uuid) -> AppResult<User> {
    store
        .find_user_by_id(id)
        .await?
        .map(User::from)
        .ok_or_else(|| AppError::not_found("user"))
}

pub async fn list_reviews(
    store: &SharedStore,
    book_id: Uuid,
    page: PageInput,
) -> AppResult<Vec<Review>> {
    let reviews = store
        .list_reviews_for_book(book_id, page.offset(), page.limit())
        .await?;
    Ok(reviews.into_iter().map(Review).collect())
}

/// Every review of a book, unpaginated
pub async fn reviews_for_book(store: &SharedStore, book_id: Uuid) -> AppResult<Vec<Review>> {
    let reviews = store.list_reviews_for_book(book_id, 0, usize::MAX).await?;
    Ok(reviews.into_iter().map(Review).collect())
}

pub async fn reviews_by_user(store: &SharedStore, user_id: Uuid) -> AppResult<Vec<Review>> {
    let reviews = store.list_reviews_by_user(user_id).await?;
    Ok(reviews.into_iter().map(Review).collect())
}

pub async fn add_book(store: &SharedStore, input: AddBookInput) -> AppResult<Book> {
    let book = store
        .create_book(NewBook {
            title: input.title,
            author: input.author,
            published_year: input.published_year,
        })
        .await?;
    tracing::info!(book_id = %book.id, "book added");
    Ok(Book(book))
}

pub async fn add_review(
    store: &SharedStore,
    principal: &Principal,
    book_id: Uuid,
    input: AddReviewInput,
) -> AppResult<Review> {
    if store.find_book(book_id).await?.is_none() {
        return Err(AppError::not_found("book"));
    }

    let review = store
        .create_review(NewReview {
            user_id: principal.id,
            book_id,
            rating: input.rating,
            comment: input.comment,
        })
        .await?;
    tracing::info!(review_id = %review.id, %book_id, user_id = %principal.id, "review added");
    Ok(Review(review))
}

pub async fn update_review(
    store: &SharedStore,
    principal: &Principal,
    review_id: Uuid,
    input: UpdateReviewInput,
) -> AppResult<Review> {
    let review = store
        .find_review(review_id)
        .await?
        .ok_or_else(|| AppError::not_found("review"))?;
    ensure_owner(principal, review.user_id)?;

    let changes = ReviewChanges {
        rating: input.rating,
        comment: input.comment,
    };
    store
        .update_review(review_id, changes)
        .await?
        .map(Review)
        .ok_or_else(|| AppError::not_found("review"))
}

pub async fn delete_review(
    store: &SharedStore,
    principal: &Principal,
    review_id: Uuid,
) -> AppResult<Review> {
    let review = store
        .find_review(review_id)
        .await?
        .ok_or_else(|| AppError::not_found("review"))?;
    ensure_owner(principal, review.user_id)?;

    let deleted = store
        .delete_review(review_id)
        .await?
        .ok_or_else(|| AppError::not_found("review"))?;
    tracing::info!(%review_id, user_id = %principal.id, "review deleted");
    Ok(Review(deleted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, NewUser, Store, UserRecord};

    async fn member(store: &SharedStore, name: &str) -> Principal {
        let record: UserRecord = store
            .create_user(NewUser {
                username: name.to_string(),
                email: format!("{}@x.com", name),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        Principal::from(&record)
    }

    async fn dune(store: &SharedStore) -> Book {
        add_book(
            store,
            AddBookInput {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                published_year: 1965,
            },
        )
        .await
        .unwrap()
    }

    fn review_input(rating: i32) -> AddReviewInput {
        AddReviewInput {
            rating,
            comment: "Spice must flow".to_string(),
        }
    }

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&ID(id.to_string()), "book"), Ok(id));
        assert!(matches!(
            parse_id(&ID("42".to_string()), "book"),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_book_is_not_found() {
        let store = MemoryStore::shared();
        assert_eq!(
            book(&store, Uuid::new_v4()).await,
            Err(AppError::not_found("book"))
        );

        let alice = member(&store, "alice").await;
        let err = add_review(&store, &alice, Uuid::new_v4(), review_input(5))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::not_found("book"));
    }

    #[tokio::test]
    async fn test_only_the_author_may_update_or_delete() {
        let store = MemoryStore::shared();
        let alice = member(&store, "alice").await;
        let bob = member(&store, "bob").await;
        let novel = dune(&store).await;
        let review = add_review(&store, &alice, novel.0.id, review_input(6)).await.unwrap();

        let change = UpdateReviewInput { rating: Some(1), comment: None };
        let err = update_review(&store, &bob, review.0.id, change.clone()).await.unwrap_err();
        assert_eq!(err, AppError::Forbidden("Not authorized".to_string()));
        let err = delete_review(&store, &bob, review.0.id).await.unwrap_err();
        assert_eq!(err, AppError::Forbidden("Not authorized".to_string()));

        let updated = update_review(&store, &alice, review.0.id, change).await.unwrap();
        assert_eq!(updated.0.rating, 1);
        assert_eq!(updated.0.comment, "Spice must flow");

        delete_review(&store, &alice, review.0.id).await.unwrap();
        assert!(store.find_review(review.0.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_review_is_not_found() {
        let store = MemoryStore::shared();
        let alice = member(&store, "alice").await;
        let err = delete_review(&store, &alice, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err, AppError::not_found("review"));
    }
}
