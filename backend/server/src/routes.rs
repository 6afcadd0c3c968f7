use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use spots::{
    Condition, Filters, Spot, approved_spot, approved_spots, compute_visible,
    filter::{AREAS, LINE_COMPANIES, POPULAR_LINES},
    submit,
};
use tracing::info;

use crate::{
    error::AppError,
    state::State,
    utils::read_spot_form,
};

#[derive(Deserialize, Default)]
pub struct SpotQuery {
    area: Option<String>,
    line: Option<String>,
    conditions: Option<String>,
}

impl TryFrom<SpotQuery> for Filters {
    type Error = AppError;

    fn try_from(query: SpotQuery) -> Result<Self, Self::Error> {
        Ok(Filters::new()
            .with_area(query.area.unwrap_or_default())
            .with_line(query.line.unwrap_or_default())
            .with_conditions(&query.conditions.unwrap_or_default())?)
    }
}

#[derive(Serialize)]
pub struct SpotList<'a> {
    spots: Vec<&'a Spot>,
    total: usize,
}

pub async fn spots_handler(
    AxumState(state): AxumState<Arc<State>>,
    Query(query): Query<SpotQuery>,
) -> Result<Response, AppError> {
    let filters = Filters::try_from(query)?;
    let spots = approved_spots(state.records.as_ref()).await;
    let visible = compute_visible(&spots, &filters);

    Ok(Json(SpotList {
        total: visible.len(),
        spots: visible,
    })
    .into_response())
}

pub async fn spot_handler(
    AxumState(state): AxumState<Arc<State>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    approved_spot(state.records.as_ref(), &id)
        .await
        .map(Json)
        .ok_or(AppError::NotFound)
}

#[derive(Serialize)]
struct ConditionEntry {
    slug: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
struct CompanyEntry {
    name: &'static str,
    lines: &'static [&'static str],
}

#[derive(Serialize)]
pub struct FilterCatalog {
    areas: &'static [&'static str],
    popular_lines: &'static [&'static str],
    companies: Vec<CompanyEntry>,
    conditions: Vec<ConditionEntry>,
}

pub async fn filters_handler() -> impl IntoResponse {
    Json(FilterCatalog {
        areas: &AREAS,
        popular_lines: &POPULAR_LINES,
        companies: LINE_COMPANIES
            .iter()
            .map(|&(name, lines)| CompanyEntry { name, lines })
            .collect(),
        conditions: Condition::ALL
            .iter()
            .map(|condition| ConditionEntry {
                slug: condition.slug(),
                label: condition.label(),
            })
            .collect(),
    })
}

#[derive(Serialize)]
struct Created {
    success: bool,
    image: String,
}

pub async fn create_spot_handler(
    AxumState(state): AxumState<Arc<State>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (draft, image) = read_spot_form(multipart).await?;
    info!("Submitting spot {}", draft.name);

    let image = submit(
        state.admin_records.as_ref(),
        state.objects.as_ref(),
        draft,
        image,
        Utc::now().timestamp_millis(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(Created {
            success: true,
            image,
        }),
    ))
}
