//! Champion routes: CRUD, listing, and best summoners.

use axum::{extract::State, response::IntoResponse, Json};

use crate::errors::{AppError, Envelope};
use crate::middleware::auth::RequireActivatedUser;
use crate::middleware::extract::{AppJson, AppQuery, EntityId};
use crate::models::champion::{
    BestSummoner, Champion, ChampionFilters, CreateChampion, UpdateChampion,
};
use crate::models::pagination::Pagination;
use crate::services::champion as champion_service;
use crate::AppState;

/// GET /v1/champions
pub async fn list(
    State(state): State<AppState>,
    AppQuery(pagination): AppQuery<Pagination>,
    AppQuery(filters): AppQuery<ChampionFilters>,
) -> Result<Json<Envelope<Vec<Champion>>>, AppError> {
    let page = champion_service::list(&state.db, &filters, &pagination).await?;
    Ok(Json(
        Envelope::new("champions", page.items).with_metadata(page.metadata),
    ))
}

/// POST /v1/champions
pub async fn create(
    State(state): State<AppState>,
    RequireActivatedUser(_user): RequireActivatedUser,
    AppJson(body): AppJson<CreateChampion>,
) -> Result<impl IntoResponse, AppError> {
    let champion = champion_service::create(&state.db, &body).await?;
    let location = format!("/v1/champions/{}", champion.id);
    Ok(Envelope::new("champion", champion).created(location))
}

/// GET /v1/champions/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<Envelope<Champion>>, AppError> {
    let champion = champion_service::find_by_id(&state.db, id).await?;
    Ok(Envelope::success("champion", champion))
}

/// PUT /v1/champions/:id
pub async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    RequireActivatedUser(_user): RequireActivatedUser,
    AppJson(body): AppJson<UpdateChampion>,
) -> Result<Json<Envelope<Champion>>, AppError> {
    let champion = champion_service::update(&state.db, id, &body).await?;
    Ok(Envelope::success("champion", champion))
}

/// DELETE /v1/champions/:id
pub async fn delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    RequireActivatedUser(_user): RequireActivatedUser,
) -> Result<Json<Envelope<&'static str>>, AppError> {
    champion_service::delete(&state.db, id).await?;
    Ok(Envelope::message("champion successfully deleted"))
}

/// GET /v1/champions/:id/best_summoners
pub async fn best_summoners(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<Envelope<Vec<BestSummoner>>>, AppError> {
    let summoners = champion_service::best_summoners(&state.db, id).await?;
    Ok(Envelope::success("best_summoners", summoners))
}
