use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::entities;
use crate::ApiError;

pub(crate) const COLUMNS: &str = "id, title, issue_number, main_character, genre, cover_year, \
     publisher, grade, price, image_url, username, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ComicModel {
    pub id: i64,
    pub title: String,
    pub issue_number: String,
    pub main_character: String,
    pub genre: String,
    pub cover_year: DateTime<Utc>,
    pub publisher: String,
    pub grade: f64,
    pub price: f64,
    pub image_url: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ComicModel {
    pub fn into_entity(self) -> entities::Comic {
        entities::Comic {
            id: self.id,
            title: self.title,
            issue_number: self.issue_number,
            main_character: self.main_character,
            genre: self.genre,
            cover_year: entities::CoverDate::from_datetime(self.cover_year),
            publisher: self.publisher,
            grade: self.grade,
            price: self.price,
            image_url: self.image_url,
            username: entities::Username::from(self.username),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    /// Case-insensitive; anything other than asc/desc is silently ignored.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(OrderDirection::Asc),
            "desc" => Some(OrderDirection::Desc),
            _ => None,
        }
    }
}

/// Optional list filters, composed conjunctively.
#[derive(Debug, Clone, Default)]
pub struct ComicFilter {
    pub username: Option<String>,
    pub title: Option<String>,
    pub order_price: Option<OrderDirection>,
}

fn build_list_query(filter: &ComicFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {} FROM comics", COLUMNS));
    let mut separator = " WHERE ";

    if let Some(username) = &filter.username {
        query.push(separator);
        query.push("username = ");
        query.push_bind(username.clone());
        separator = " AND ";
    }

    if let Some(title) = &filter.title {
        query.push(separator);
        query.push("title ILIKE ");
        query.push_bind(format!("%{}%", title));
    }

    match filter.order_price {
        Some(OrderDirection::Asc) => {
            query.push(" ORDER BY price ASC");
        }
        Some(OrderDirection::Desc) => {
            query.push(" ORDER BY price DESC");
        }
        None => {}
    }

    query
}

pub async fn list(pool: &PgPool, filter: &ComicFilter) -> Result<Vec<entities::Comic>, ApiError> {
    let models: Vec<ComicModel> = build_list_query(filter)
        .build_query_as()
        .fetch_all(pool)
        .await?;

    Ok(models.into_iter().map(ComicModel::into_entity).collect())
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<entities::Comic>, ApiError> {
    let model = sqlx::query_as::<_, ComicModel>(&format!(
        "SELECT {} FROM comics WHERE id = $1",
        COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(model.map(ComicModel::into_entity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_filters_means_no_where_clause() {
        let sql = build_list_query(&ComicFilter::default()).sql().to_owned();
        assert!(!sql.contains("WHERE"));
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn filters_compose_conjunctively() {
        let filter = ComicFilter {
            username: Some("alice".to_owned()),
            title: Some("bat".to_owned()),
            order_price: Some(OrderDirection::Desc),
        };
        let sql = build_list_query(&filter).sql().to_owned();
        assert!(sql.ends_with("WHERE username = $1 AND title ILIKE $2 ORDER BY price DESC"));
    }

    #[test]
    fn title_filter_stands_alone() {
        let filter = ComicFilter {
            title: Some("bat".to_owned()),
            ..ComicFilter::default()
        };
        let sql = build_list_query(&filter).sql().to_owned();
        assert!(sql.ends_with("WHERE title ILIKE $1"));
    }

    #[test]
    fn order_direction_is_case_insensitive() {
        assert_eq!(OrderDirection::parse("ASC"), Some(OrderDirection::Asc));
        assert_eq!(OrderDirection::parse("Desc"), Some(OrderDirection::Desc));
        assert_eq!(OrderDirection::parse("bogus"), None);
    }
}
