use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    database::{RecordStore, UserStore},
    middleware::auth::Claims,
    models::{NewRecord, Record, RecordPatch, RecordResponse, TopicProgress, UserProfile},
    services::record_service,
    utils::ApiError,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopicQuery {
    /// Exact topic tag, e.g. `Dynamic Programming`
    pub topics: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct RatingQuery {
    /// Minimum codeforces rating (inclusive)
    pub min_rating: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DifficultyQuery {
    /// One of `easy`, `medium`, `hard`
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct TimeSpentQuery {
    /// Bucket such as `30min`; records in this bucket or above are returned
    pub max_time: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive text to look for in notes
    pub query: Option<String>,
}

fn records_json(records: Vec<Record>) -> HttpResponse {
    let body: Vec<RecordResponse> = records.into_iter().map(RecordResponse::from).collect();
    HttpResponse::Ok().json(body)
}

/// GET /api/questions - every record owned by the caller
#[utoipa::path(
    get,
    path = "/api/questions",
    tag = "Questions",
    responses(
        (status = 200, description = "Caller's records", body = [RecordResponse]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_questions(
    user: web::ReqData<Claims>,
    store: web::Data<dyn RecordStore>,
) -> Result<HttpResponse, ApiError> {
    let records = record_service::list_all(store.get_ref(), &user.sub).await?;
    log::info!("📋 Listed {} questions for user {}", records.len(), user.sub);
    Ok(records_json(records))
}

#[utoipa::path(
    get,
    path = "/api/questions/user",
    tag = "Questions",
    responses(
        (status = 200, description = "Caller's identity", body = UserProfile),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    user: web::ReqData<Claims>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, ApiError> {
    let profile = record_service::profile(users.get_ref(), &user.sub).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    post,
    path = "/api/questions",
    tag = "Questions",
    request_body = NewRecord,
    responses(
        (status = 201, description = "Record created", body = RecordResponse),
        (status = 400, description = "Invalid record")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_question(
    user: web::ReqData<Claims>,
    store: web::Data<dyn RecordStore>,
    body: web::Json<NewRecord>,
) -> Result<HttpResponse, ApiError> {
    let record = record_service::create(store.get_ref(), &user.sub, body.into_inner()).await?;
    log::info!("✅ Question created for user {}", user.sub);
    Ok(HttpResponse::Created().json(RecordResponse::from(record)))
}

#[utoipa::path(
    patch,
    path = "/api/questions/{id}",
    tag = "Questions",
    params(("id" = String, Path, description = "Record id")),
    request_body = RecordPatch,
    responses(
        (status = 200, description = "Updated record", body = RecordResponse),
        (status = 404, description = "No such record owned by the caller")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_question(
    user: web::ReqData<Claims>,
    store: web::Data<dyn RecordStore>,
    path: web::Path<String>,
    body: web::Json<RecordPatch>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    log::info!("🔧 PATCH /questions/{} for user {}", id, user.sub);

    let record = record_service::update(store.get_ref(), &user.sub, &id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(RecordResponse::from(record)))
}

#[utoipa::path(
    delete,
    path = "/api/questions/{id}",
    tag = "Questions",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Record deleted"),
        (status = 404, description = "No such record owned by the caller")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_question(
    user: web::ReqData<Claims>,
    store: web::Data<dyn RecordStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    log::info!("🗑️  DELETE /questions/{} for user {}", id, user.sub);

    record_service::delete(store.get_ref(), &user.sub, &id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Question deleted successfully"
    })))
}

#[utoipa::path(
    get,
    path = "/api/questions/search",
    tag = "Questions",
    params(SearchQuery),
    responses((status = 200, description = "Records whose notes match", body = [RecordResponse])),
    security(("bearer_auth" = []))
)]
pub async fn search_questions(
    user: web::ReqData<Claims>,
    store: web::Data<dyn RecordStore>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let records =
        record_service::search(store.get_ref(), &user.sub, query.query.as_deref()).await?;
    Ok(records_json(records))
}

#[utoipa::path(
    get,
    path = "/api/questions/byTopic",
    tag = "Questions",
    params(TopicQuery),
    responses(
        (status = 200, description = "Records tagged with the topic", body = [RecordResponse]),
        (status = 400, description = "Topic is required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn questions_by_topic(
    user: web::ReqData<Claims>,
    store: web::Data<dyn RecordStore>,
    query: web::Query<TopicQuery>,
) -> Result<HttpResponse, ApiError> {
    let records =
        record_service::by_topic(store.get_ref(), &user.sub, query.topics.as_deref()).await?;
    Ok(records_json(records))
}

#[utoipa::path(
    get,
    path = "/api/questions/byDifficulty",
    tag = "Questions",
    params(DifficultyQuery),
    responses(
        (status = 200, description = "Zero-rated records with this difficulty", body = [RecordResponse]),
        (status = 400, description = "Invalid or missing difficulty")
    ),
    security(("bearer_auth" = []))
)]
pub async fn questions_by_difficulty(
    user: web::ReqData<Claims>,
    store: web::Data<dyn RecordStore>,
    query: web::Query<DifficultyQuery>,
) -> Result<HttpResponse, ApiError> {
    let records =
        record_service::by_difficulty(store.get_ref(), &user.sub, query.difficulty.as_deref())
            .await?;
    Ok(records_json(records))
}

#[utoipa::path(
    get,
    path = "/api/questions/byRating",
    tag = "Questions",
    params(RatingQuery),
    responses(
        (status = 200, description = "Codeforces records at or above the rating", body = [RecordResponse]),
        (status = 400, description = "Invalid or missing rating"),
        (status = 404, description = "No questions found with the given rating")
    ),
    security(("bearer_auth" = []))
)]
pub async fn questions_by_rating(
    user: web::ReqData<Claims>,
    store: web::Data<dyn RecordStore>,
    query: web::Query<RatingQuery>,
) -> Result<HttpResponse, ApiError> {
    let records =
        record_service::by_rating(store.get_ref(), &user.sub, query.min_rating.as_deref()).await?;
    Ok(records_json(records))
}

#[utoipa::path(
    get,
    path = "/api/questions/byTimeSpent",
    tag = "Questions",
    params(TimeSpentQuery),
    responses(
        (status = 200, description = "Records in the bucket or any longer one", body = [RecordResponse]),
        (status = 400, description = "Invalid or missing time bucket")
    ),
    security(("bearer_auth" = []))
)]
pub async fn questions_by_time_spent(
    user: web::ReqData<Claims>,
    store: web::Data<dyn RecordStore>,
    query: web::Query<TimeSpentQuery>,
) -> Result<HttpResponse, ApiError> {
    let records =
        record_service::by_time_spent(store.get_ref(), &user.sub, query.max_time.as_deref())
            .await?;
    Ok(records_json(records))
}

#[utoipa::path(
    get,
    path = "/api/questions/progress",
    tag = "Questions",
    responses((status = 200, description = "Per-topic totals", body = [TopicProgress])),
    security(("bearer_auth" = []))
)]
pub async fn topic_progress(
    user: web::ReqData<Claims>,
    store: web::Data<dyn RecordStore>,
) -> Result<HttpResponse, ApiError> {
    let progress = record_service::progress_by_topic(store.get_ref(), &user.sub).await?;
    Ok(HttpResponse::Ok().json(progress))
}
