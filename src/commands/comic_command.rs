use sqlx::PgPool;

use crate::entities;
use crate::queries::{self, ComicModel};
use crate::ApiError;

/// Persists a new record for the authenticated caller. Ownership comes from
/// the verified token, never from the payload; the image URL is normalized
/// before it is stored.
pub async fn create(
    pool: &PgPool,
    username: entities::Username,
    new_comic: entities::NewComic,
) -> Result<entities::Comic, ApiError> {
    let image_url = entities::normalize_image_url(&new_comic.image_url)
        .map_err(|err| ApiError::Validation(err.to_string()))?;

    let model = sqlx::query_as::<_, ComicModel>(&format!(
        "INSERT INTO comics \
             (title, issue_number, main_character, genre, cover_year, \
              publisher, grade, price, image_url, username) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {}",
        queries::COLUMNS
    ))
    .bind(new_comic.title)
    .bind(new_comic.issue_number)
    .bind(new_comic.main_character)
    .bind(new_comic.genre)
    .bind(new_comic.cover_year.to_datetime())
    .bind(new_comic.publisher)
    .bind(new_comic.grade)
    .bind(new_comic.price)
    .bind(image_url)
    .bind(String::from(username))
    .fetch_one(pool)
    .await?;

    Ok(model.into_entity())
}

/// Merges the patch onto an existing record and persists the result.
///
/// Existence is checked before ownership, so a caller can tell a missing
/// record (404) from someone else's (403). That ordering is deliberate.
pub async fn update(
    pool: &PgPool,
    username: entities::Username,
    id: i64,
    patch: entities::UpdateComic,
) -> Result<entities::Comic, ApiError> {
    let mut comic = queries::find_by_id(pool, id)
        .await?
        .ok_or(ApiError::NotFound(id))?;

    if comic.username != username {
        return Err(ApiError::Forbidden);
    }

    comic.apply(patch);

    let model = sqlx::query_as::<_, ComicModel>(&format!(
        "UPDATE comics SET \
             title = $1, issue_number = $2, main_character = $3, genre = $4, \
             cover_year = $5, publisher = $6, grade = $7, price = $8, \
             image_url = $9, updated_at = now() \
         WHERE id = $10 \
         RETURNING {}",
        queries::COLUMNS
    ))
    .bind(comic.title)
    .bind(comic.issue_number)
    .bind(comic.main_character)
    .bind(comic.genre)
    .bind(comic.cover_year.to_datetime())
    .bind(comic.publisher)
    .bind(comic.grade)
    .bind(comic.price)
    .bind(comic.image_url)
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(model.into_entity())
}

/// Removes a record permanently. Same existence-then-ownership ordering as
/// `update`; a repeated delete of the same id is a 404, not a success.
pub async fn delete(
    pool: &PgPool,
    username: entities::Username,
    id: i64,
) -> Result<(), ApiError> {
    let comic = queries::find_by_id(pool, id)
        .await?
        .ok_or(ApiError::NotFound(id))?;

    if comic.username != username {
        return Err(ApiError::Forbidden);
    }

    sqlx::query("DELETE FROM comics WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn new_comic() -> entities::NewComic {
        entities::NewComic {
            title: "Batman #52".to_owned(),
            issue_number: "52".to_owned(),
            main_character: "Batman".to_owned(),
            genre: "superhero".to_owned(),
            cover_year: entities::CoverDate::from(NaiveDate::from_ymd_opt(2011, 2, 3).unwrap()),
            publisher: "DC".to_owned(),
            grade: 9.2,
            price: 32.21,
            image_url: "http://x/y.jpg".to_owned(),
        }
    }

    #[sqlx::test]
    async fn create_stamps_ownership_and_the_marker(pool: PgPool) {
        let comic = create(&pool, "alice".into(), new_comic()).await.unwrap();
        assert_eq!(comic.username, entities::Username::from("alice"));
        assert_eq!(comic.image_url, "http://x/y.jpg?test=done");
        assert!(comic.id >= 1);

        let fetched = queries::find_by_id(&pool, comic.id).await.unwrap().unwrap();
        assert_eq!(fetched, comic);
    }

    #[sqlx::test]
    async fn update_of_a_missing_record_is_not_found(pool: PgPool) {
        let err = update(&pool, "alice".into(), 1, entities::UpdateComic::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(1)));
    }

    #[sqlx::test]
    async fn update_by_a_non_owner_is_forbidden(pool: PgPool) {
        let comic = create(&pool, "alice".into(), new_comic()).await.unwrap();

        let patch = entities::UpdateComic {
            price: Some(45.0),
            ..entities::UpdateComic::default()
        };
        let err = update(&pool, "bob".into(), comic.id, patch).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));

        let fetched = queries::find_by_id(&pool, comic.id).await.unwrap().unwrap();
        assert_eq!(fetched.price, 32.21);
    }

    #[sqlx::test]
    async fn owner_update_merges_present_fields(pool: PgPool) {
        let comic = create(&pool, "alice".into(), new_comic()).await.unwrap();

        let patch = entities::UpdateComic {
            price: Some(45.0),
            genre: Some("noir".to_owned()),
            ..entities::UpdateComic::default()
        };
        let updated = update(&pool, "alice".into(), comic.id, patch).await.unwrap();
        assert_eq!(updated.price, 45.0);
        assert_eq!(updated.genre, "noir");
        assert_eq!(updated.title, "Batman #52");
        assert_eq!(updated.username, entities::Username::from("alice"));

        let fetched = queries::find_by_id(&pool, comic.id).await.unwrap().unwrap();
        assert_eq!(fetched, updated);
    }

    #[sqlx::test]
    async fn delete_of_a_missing_record_is_not_found(pool: PgPool) {
        let err = delete(&pool, "alice".into(), 1).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(1)));
    }

    #[sqlx::test]
    async fn delete_by_a_non_owner_is_forbidden(pool: PgPool) {
        let comic = create(&pool, "alice".into(), new_comic()).await.unwrap();

        let err = delete(&pool, "bob".into(), comic.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));

        assert!(queries::find_by_id(&pool, comic.id)
            .await
            .unwrap()
            .is_some());
    }

    #[sqlx::test]
    async fn repeated_delete_is_not_found(pool: PgPool) {
        let comic = create(&pool, "alice".into(), new_comic()).await.unwrap();

        delete(&pool, "alice".into(), comic.id).await.unwrap();
        assert!(queries::find_by_id(&pool, comic.id)
            .await
            .unwrap()
            .is_none());

        let err = delete(&pool, "alice".into(), comic.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(id) if id == comic.id));
    }
}

