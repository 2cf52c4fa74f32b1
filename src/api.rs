use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::ServerKey;
use crate::entities::{NewComic, UpdateComic};
use crate::queries::{ComicFilter, OrderDirection};
use crate::{commands, queries, ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    username: Option<String>,
    title: Option<String>,
    #[serde(rename = "order[price]")]
    order_price: Option<String>,
}

impl ListParams {
    fn into_filter(self) -> ComicFilter {
        ComicFilter {
            // An empty parameter value counts as absent, like the original.
            username: self.username.filter(|s| !s.is_empty()),
            title: self.title.filter(|s| !s.is_empty()),
            order_price: self.order_price.as_deref().and_then(OrderDirection::parse),
        }
    }
}

async fn redirect_to_v1() -> HttpResponse {
    HttpResponse::MovedPermanently()
        .insert_header((header::LOCATION, "/v1/comics"))
        .finish()
}

async fn list_comics(
    pool: web::Data<PgPool>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, ApiError> {
    let comics = queries::list(&pool, &params.into_inner().into_filter()).await?;
    Ok(HttpResponse::Ok().json(comics))
}

async fn get_comic(
    pool: web::Data<PgPool>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let comic = queries::find_by_id(&pool, id)
        .await?
        .ok_or(ApiError::NotFound(id))?;
    Ok(HttpResponse::Ok().json(comic))
}

async fn create_comic(
    pool: web::Data<PgPool>,
    server_key: web::Data<ServerKey>,
    req: HttpRequest,
    payload: web::Json<NewComic>,
) -> Result<HttpResponse, ApiError> {
    let username = server_key.authenticate(&req)?;
    let comic = commands::create(&pool, username, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(comic))
}

async fn update_comic(
    pool: web::Data<PgPool>,
    server_key: web::Data<ServerKey>,
    req: HttpRequest,
    id: web::Path<i64>,
    payload: web::Json<UpdateComic>,
) -> Result<HttpResponse, ApiError> {
    let username = server_key.authenticate(&req)?;
    let comic = commands::update(&pool, username, id.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comic))
}

async fn delete_comic(
    pool: web::Data<PgPool>,
    server_key: web::Data<ServerKey>,
    req: HttpRequest,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let username = server_key.authenticate(&req)?;
    commands::delete(&pool, username, id.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Route table, shared by `main` and the integration tests. The unversioned
/// root redirects permanently into the versioned prefix.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(redirect_to_v1)))
        .service(
            web::scope("/v1")
                .route("/comics", web::get().to(list_comics))
                .route("/comics", web::post().to(create_comic))
                .route("/comics/{id}", web::get().to(get_comic))
                .route("/comics/{id}", web::patch().to(update_comic))
                .route("/comics/{id}", web::delete().to(delete_comic)),
        );
}
