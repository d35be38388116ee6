//! Match routes. Creating a match applies its statistics.

use axum::{extract::State, response::IntoResponse, Json};

use crate::errors::{AppError, Envelope};
use crate::middleware::auth::RequireActivatedUser;
use crate::middleware::extract::{AppJson, AppQuery, EntityId};
use crate::models::match_record::{
    CreateMatch, Match, MatchFilters, SummonerPerformance, UpdateMatch,
};
use crate::models::pagination::Pagination;
use crate::services::match_record as match_service;
use crate::AppState;

/// GET /v1/matches
pub async fn list(
    State(state): State<AppState>,
    AppQuery(pagination): AppQuery<Pagination>,
    AppQuery(filters): AppQuery<MatchFilters>,
) -> Result<Json<Envelope<Vec<Match>>>, AppError> {
    let page = match_service::list(&state.db, &filters, &pagination).await?;
    Ok(Json(
        Envelope::new("matches", page.items).with_metadata(page.metadata),
    ))
}

/// POST /v1/matches: record a completed match.
pub async fn create(
    State(state): State<AppState>,
    RequireActivatedUser(_user): RequireActivatedUser,
    AppJson(body): AppJson<CreateMatch>,
) -> Result<impl IntoResponse, AppError> {
    let record = match_service::create(&state.db, &body, state.config.stats_tx_timeout).await?;
    let location = format!("/v1/matches/{}", record.id);
    Ok(Envelope::new("match", record).created(location))
}

/// GET /v1/matches/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<Envelope<Match>>, AppError> {
    let record = match_service::find_by_id(&state.db, id).await?;
    Ok(Envelope::success("match", record))
}

/// PUT /v1/matches/:id: duration and played date only.
pub async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    RequireActivatedUser(_user): RequireActivatedUser,
    AppJson(body): AppJson<UpdateMatch>,
) -> Result<Json<Envelope<Match>>, AppError> {
    let record = match_service::update(&state.db, id, &body).await?;
    Ok(Envelope::success("match", record))
}

/// DELETE /v1/matches/:id
pub async fn delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    RequireActivatedUser(_user): RequireActivatedUser,
) -> Result<Json<Envelope<&'static str>>, AppError> {
    match_service::delete(&state.db, id).await?;
    Ok(Envelope::message("match successfully deleted"))
}

/// GET /v1/matches/:id/summoners
pub async fn summoners(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<Envelope<Vec<SummonerPerformance>>>, AppError> {
    let performances = match_service::performances(&state.db, id).await?;
    Ok(Envelope::success("summoners", performances))
}
