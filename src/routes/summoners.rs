//! Summoner routes: CRUD, listing, and per-champion/per-role stats.

use axum::{extract::State, response::IntoResponse, Json};

use crate::errors::{AppError, Envelope};
use crate::middleware::auth::RequireActivatedUser;
use crate::middleware::extract::{AppJson, AppQuery, EntityId};
use crate::models::pagination::Pagination;
use crate::models::summoner::{
    CreateSummoner, Summoner, SummonerFilters, SummonerStats, UpdateSummoner,
};
use crate::services::summoner as summoner_service;
use crate::AppState;

/// GET /v1/summoners: list summoners with filters, sorting, and pagination.
pub async fn list(
    State(state): State<AppState>,
    AppQuery(pagination): AppQuery<Pagination>,
    AppQuery(filters): AppQuery<SummonerFilters>,
) -> Result<Json<Envelope<Vec<Summoner>>>, AppError> {
    let page = summoner_service::list(&state.db, &filters, &pagination).await?;
    Ok(Json(
        Envelope::new("summoners", page.items).with_metadata(page.metadata),
    ))
}

/// POST /v1/summoners
pub async fn create(
    State(state): State<AppState>,
    RequireActivatedUser(_user): RequireActivatedUser,
    AppJson(body): AppJson<CreateSummoner>,
) -> Result<impl IntoResponse, AppError> {
    let summoner = summoner_service::create(&state.db, &body).await?;
    let location = format!("/v1/summoners/{}", summoner.id);
    Ok(Envelope::new("summoner", summoner).created(location))
}

/// GET /v1/summoners/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<Envelope<Summoner>>, AppError> {
    let summoner = summoner_service::find_by_id(&state.db, id).await?;
    Ok(Envelope::success("summoner", summoner))
}

/// PUT /v1/summoners/:id
pub async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    RequireActivatedUser(_user): RequireActivatedUser,
    AppJson(body): AppJson<UpdateSummoner>,
) -> Result<Json<Envelope<Summoner>>, AppError> {
    let summoner = summoner_service::update(&state.db, id, &body).await?;
    Ok(Envelope::success("summoner", summoner))
}

/// DELETE /v1/summoners/:id
pub async fn delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    RequireActivatedUser(_user): RequireActivatedUser,
) -> Result<Json<Envelope<&'static str>>, AppError> {
    summoner_service::delete(&state.db, id).await?;
    Ok(Envelope::message("summoner successfully deleted"))
}

/// GET /v1/summoners/:id/stats: most played champions and roles.
pub async fn stats(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<Envelope<SummonerStats>>, AppError> {
    let stats = summoner_service::stats(&state.db, id).await?;
    Ok(Envelope::success("stats", stats))
}
