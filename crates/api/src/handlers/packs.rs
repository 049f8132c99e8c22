//! Short-film packs: listing, detail, CRUD and membership.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use lao_cinema_core::audit::{action_types, entity_types};
use lao_cinema_core::locale::{pick, Language};
use lao_cinema_core::types::DbId;
use lao_cinema_core::validation::{
    validate_currency, validate_media_path, validate_price_cents, validate_slug, validate_title,
};
use lao_cinema_db::models::short_pack::{
    AddPackItem, CreateShortPack, PackText, ShortPack, ShortPackItem, ShortPackTranslation,
    UpdateShortPack,
};
use lao_cinema_db::repositories::{MovieRepo, ShortPackRepo};
use serde::Serialize;

use super::movies::load_visible_movie;
use super::not_found;
use crate::audit::{self, AuditEntry};
use crate::error::AppResult;
use crate::middleware::rbac::RequireEditor;
use crate::middleware::viewer::Viewer;
use crate::query::LangParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PackSummary {
    #[serde(flatten)]
    pub pack: ShortPack,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PackDetail {
    #[serde(flatten)]
    pub summary: PackSummary,
    pub translations: Vec<ShortPackTranslation>,
    pub items: Vec<ShortPackItem>,
    /// Sum of the runtimes of the pack's movies, where known.
    pub total_runtime_minutes: i64,
}

fn summarize(pack: ShortPack, translations: &[ShortPackTranslation], lang: Language) -> PackSummary {
    let display = pick(translations, lang);
    PackSummary {
        title: display.map(|t| t.title.clone()),
        description: display.and_then(|t| t.description.clone()),
        pack,
    }
}

fn validate_texts(texts: &mut [PackText]) -> AppResult<()> {
    for text in texts.iter_mut() {
        text.language = Language::parse(&text.language)?.code().to_string();
        validate_title(&text.title)?;
    }
    Ok(())
}

/// Load a pack the viewer may see. Unpublished packs are editor-only.
async fn load_visible_pack(state: &AppState, viewer: &Viewer, id: DbId) -> AppResult<ShortPack> {
    ShortPackRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|p| p.is_published || viewer.can_edit())
        .ok_or_else(|| not_found("Short pack", id))
}

/// GET /api/v1/packs
pub async fn list_packs(
    State(state): State<AppState>,
    viewer: Viewer,
    headers: HeaderMap,
    Query(lang): Query<LangParams>,
) -> AppResult<Json<DataResponse<Vec<PackSummary>>>> {
    let lang = lang.resolve(&headers)?;
    let packs = ShortPackRepo::list(&state.pool, viewer.can_edit()).await?;

    let ids: Vec<DbId> = packs.iter().map(|p| p.id).collect();
    let mut by_pack: HashMap<DbId, Vec<ShortPackTranslation>> = HashMap::new();
    for t in ShortPackRepo::translations_for(&state.pool, &ids).await? {
        by_pack.entry(t.pack_id).or_default().push(t);
    }

    let items = packs
        .into_iter()
        .map(|pack| {
            let translations = by_pack.remove(&pack.id).unwrap_or_default();
            summarize(pack, &translations, lang)
        })
        .collect();
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/packs/{id}
pub async fn get_pack(
    State(state): State<AppState>,
    viewer: Viewer,
    headers: HeaderMap,
    Path(id): Path<DbId>,
    Query(lang): Query<LangParams>,
) -> AppResult<Json<DataResponse<PackDetail>>> {
    let lang = lang.resolve(&headers)?;
    let pack = load_visible_pack(&state, &viewer, id).await?;
    let translations = ShortPackRepo::translations_for(&state.pool, &[id]).await?;
    let items = ShortPackRepo::items(&state.pool, id).await?;
    let total_runtime_minutes = items
        .iter()
        .filter_map(|i| i.runtime_minutes)
        .map(i64::from)
        .sum();

    Ok(Json(DataResponse {
        data: PackDetail {
            summary: summarize(pack, &translations, lang),
            translations,
            items,
            total_runtime_minutes,
        },
    }))
}

/// POST /api/v1/packs
pub async fn create_pack(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Json(mut input): Json<CreateShortPack>,
) -> AppResult<(StatusCode, Json<DataResponse<ShortPack>>)> {
    validate_slug(&input.slug)?;
    validate_price_cents(input.price_cents)?;
    if let Some(currency) = input.currency.as_deref() {
        validate_currency(currency)?;
    }
    if let Some(path) = input.poster_path.as_deref() {
        validate_media_path(path)?;
    }
    validate_texts(&mut input.translations)?;

    let pack = ShortPackRepo::create(&state.pool, &input).await?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_CREATE)
            .by(Some(user.user_id))
            .entity(entity_types::SHORT_PACK, pack.id)
            .details(serde_json::json!({ "slug": pack.slug })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: pack })))
}

/// PUT /api/v1/packs/{id}
pub async fn update_pack(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateShortPack>,
) -> AppResult<Json<DataResponse<ShortPack>>> {
    if let Some(slug) = input.slug.as_deref() {
        validate_slug(slug)?;
    }
    validate_price_cents(input.price_cents)?;
    if let Some(currency) = input.currency.as_deref() {
        validate_currency(currency)?;
    }
    if let Some(path) = input.poster_path.as_deref() {
        validate_media_path(path)?;
    }
    if let Some(texts) = input.translations.as_mut() {
        validate_texts(texts)?;
    }

    let pack = ShortPackRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("Short pack", id))?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_UPDATE)
            .by(Some(user.user_id))
            .entity(entity_types::SHORT_PACK, id),
    )
    .await;

    Ok(Json(DataResponse { data: pack }))
}

/// DELETE /api/v1/packs/{id}
pub async fn delete_pack(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ShortPackRepo::delete(&state.pool, id).await? {
        return Err(not_found("Short pack", id));
    }
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_DELETE)
            .by(Some(user.user_id))
            .entity(entity_types::SHORT_PACK, id),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/movies/{id}/packs
///
/// Published packs that include the movie, for "also available in" links.
pub async fn packs_for_movie(
    State(state): State<AppState>,
    viewer: Viewer,
    headers: HeaderMap,
    Path(movie_id): Path<DbId>,
    Query(lang): Query<LangParams>,
) -> AppResult<Json<DataResponse<Vec<PackSummary>>>> {
    let lang = lang.resolve(&headers)?;
    load_visible_movie(&state, &viewer, movie_id).await?;

    let packs = ShortPackRepo::containing_movie(&state.pool, movie_id, viewer.can_edit()).await?;
    let ids: Vec<DbId> = packs.iter().map(|p| p.id).collect();
    let mut by_pack: HashMap<DbId, Vec<ShortPackTranslation>> = HashMap::new();
    for t in ShortPackRepo::translations_for(&state.pool, &ids).await? {
        by_pack.entry(t.pack_id).or_default().push(t);
    }

    let items = packs
        .into_iter()
        .map(|pack| {
            let translations = by_pack.remove(&pack.id).unwrap_or_default();
            summarize(pack, &translations, lang)
        })
        .collect();
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/packs/{id}/items
pub async fn add_item(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(pack_id): Path<DbId>,
    Json(input): Json<AddPackItem>,
) -> AppResult<(StatusCode, Json<DataResponse<ShortPackItem>>)> {
    ShortPackRepo::find_by_id(&state.pool, pack_id)
        .await?
        .ok_or_else(|| not_found("Short pack", pack_id))?;
    MovieRepo::find_by_id(&state.pool, input.movie_id)
        .await?
        .ok_or_else(|| not_found("Movie", input.movie_id))?;

    let item = ShortPackRepo::add_item(&state.pool, pack_id, &input).await?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_UPDATE)
            .by(Some(user.user_id))
            .entity(entity_types::SHORT_PACK, pack_id)
            .details(serde_json::json!({ "added_movie_id": input.movie_id })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// DELETE /api/v1/packs/{id}/items/{movie_id}
pub async fn remove_item(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path((pack_id, movie_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !ShortPackRepo::remove_item(&state.pool, pack_id, movie_id).await? {
        return Err(not_found("Pack item", movie_id));
    }
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_UPDATE)
            .by(Some(user.user_id))
            .entity(entity_types::SHORT_PACK, pack_id)
            .details(serde_json::json!({ "removed_movie_id": movie_id })),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}
