//! Carousel view endpoint
//!
//! Serves a category's publications together with the initial engine state
//! and card layouts, so a client can render the first frame without running
//! the navigation rules itself.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    carousel::{CardLayout, CarouselEngine},
    error::AppResult,
    models::Publication,
    AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CarouselQuery {
    /// Card to activate instead of the default one
    pub index: Option<usize>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarouselView {
    pub category: String,
    /// Active card, absent for an empty category
    pub current_index: Option<usize>,
    pub card_width: f64,
    pub publications: Vec<Publication>,
    pub cards: Vec<CardLayout>,
}

/// Carousel state for one category
#[utoipa::path(
    get,
    path = "/carousel/{category}",
    tag = "carousel",
    params(
        ("category" = String, Path, description = "Category label, case-insensitive"),
        CarouselQuery
    ),
    responses(
        (status = 200, description = "Publications with card layouts; empty for General or unknown categories", body = CarouselView)
    )
)]
pub async fn get_carousel(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<CarouselQuery>,
) -> AppResult<Json<CarouselView>> {
    let publications = state.services.publications.list_carousel(&category).await?;

    let mut engine = CarouselEngine::with_config(publications.len(), state.config.carousel);
    if let Some(index) = query.index {
        engine.go_to_index(index);
    }

    Ok(Json(CarouselView {
        category,
        current_index: engine.current_index(),
        card_width: engine.config().card_width,
        cards: engine.layouts(),
        publications,
    }))
}
