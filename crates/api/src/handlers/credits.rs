//! Cast and crew credits under `/movies/{id}/cast` and `/movies/{id}/crew`.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use lao_cinema_core::audit::{action_types, entity_types};
use lao_cinema_core::error::CoreError;
use lao_cinema_core::locale::{pick, Language};
use lao_cinema_core::types::DbId;
use lao_cinema_db::models::credit::{
    CastCredit, CastTranslation, CreateCastCredit, CreateCrewCredit, CreditText, CrewCredit,
    CrewTranslation, UpdateCastCredit, UpdateCrewCredit,
};
use lao_cinema_db::models::person::PersonTranslation;
use lao_cinema_db::repositories::{CreditRepo, MovieRepo, PersonRepo};
use serde::Serialize;

use super::movies::load_visible_movie;
use super::not_found;
use crate::audit::{self, AuditEntry};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireEditor;
use crate::middleware::viewer::Viewer;
use crate::query::LangParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// A cast credit with the person's name and character name localised.
#[derive(Debug, Serialize)]
pub struct CastEntry {
    #[serde(flatten)]
    pub credit: CastCredit,
    pub person_name: Option<String>,
    pub character_name: Option<String>,
    pub character_names: Vec<CastTranslation>,
}

#[derive(Debug, Serialize)]
pub struct CrewEntry {
    #[serde(flatten)]
    pub credit: CrewCredit,
    pub person_name: Option<String>,
    pub job: Option<String>,
    pub jobs: Vec<CrewTranslation>,
}

#[derive(Debug, Serialize)]
pub struct Credits {
    pub cast: Vec<CastEntry>,
    pub crew: Vec<CrewEntry>,
}

/// Load cast and crew for a movie, ordered by `display_order`, with names
/// picked for `lang`.
pub(crate) async fn load_credits(
    state: &AppState,
    movie_id: DbId,
    lang: Language,
) -> AppResult<(Vec<CastEntry>, Vec<CrewEntry>)> {
    let cast = CreditRepo::list_cast(&state.pool, movie_id).await?;
    let crew = CreditRepo::list_crew(&state.pool, movie_id).await?;

    let mut person_ids: Vec<DbId> = cast
        .iter()
        .map(|c| c.person_id)
        .chain(crew.iter().map(|c| c.person_id))
        .collect();
    person_ids.sort_unstable();
    person_ids.dedup();

    let names = group_by(
        PersonRepo::translations_for(&state.pool, &person_ids).await?,
        |t: &PersonTranslation| t.person_id,
    );
    let person_name = |id: DbId| {
        names
            .get(&id)
            .and_then(|ts| pick(ts, lang))
            .map(|t| t.name.clone())
    };

    let cast_ids: Vec<DbId> = cast.iter().map(|c| c.id).collect();
    let mut characters = group_by(
        CreditRepo::cast_translations(&state.pool, &cast_ids).await?,
        |t: &CastTranslation| t.cast_id,
    );
    let crew_ids: Vec<DbId> = crew.iter().map(|c| c.id).collect();
    let mut jobs = group_by(
        CreditRepo::crew_translations(&state.pool, &crew_ids).await?,
        |t: &CrewTranslation| t.crew_id,
    );

    let cast = cast
        .into_iter()
        .map(|credit| {
            let character_names = characters.remove(&credit.id).unwrap_or_default();
            CastEntry {
                person_name: person_name(credit.person_id),
                character_name: pick(&character_names, lang).map(|t| t.character_name.clone()),
                character_names,
                credit,
            }
        })
        .collect();

    let crew = crew
        .into_iter()
        .map(|credit| {
            let jobs = jobs.remove(&credit.id).unwrap_or_default();
            CrewEntry {
                person_name: person_name(credit.person_id),
                job: pick(&jobs, lang).map(|t| t.job.clone()),
                jobs,
                credit,
            }
        })
        .collect();

    Ok((cast, crew))
}

fn group_by<T>(rows: Vec<T>, key: impl Fn(&T) -> DbId) -> HashMap<DbId, Vec<T>> {
    let mut map: HashMap<DbId, Vec<T>> = HashMap::new();
    for row in rows {
        map.entry(key(&row)).or_default().push(row);
    }
    map
}

/// Canonicalize language codes and reject blank labels or duplicate languages.
fn normalize_texts(field: &str, texts: &mut [CreditText]) -> AppResult<()> {
    let mut seen = Vec::with_capacity(texts.len());
    for text in texts.iter_mut() {
        let lang = Language::parse(&text.language)?;
        if text.text.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "{field} for '{lang}' must not be empty"
            ))));
        }
        if seen.contains(&lang) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Duplicate {field} for language '{lang}'"
            ))));
        }
        seen.push(lang);
        text.language = lang.code().to_string();
        text.text = text.text.trim().to_string();
    }
    Ok(())
}

async fn ensure_movie_exists(state: &AppState, movie_id: DbId) -> AppResult<()> {
    MovieRepo::find_by_id(&state.pool, movie_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| not_found("Movie", movie_id))
}

/// GET /api/v1/movies/{id}/credits
pub async fn list_credits(
    State(state): State<AppState>,
    viewer: Viewer,
    headers: HeaderMap,
    Path(movie_id): Path<DbId>,
    Query(lang): Query<LangParams>,
) -> AppResult<Json<DataResponse<Credits>>> {
    let lang = lang.resolve(&headers)?;
    load_visible_movie(&state, &viewer, movie_id).await?;
    let (cast, crew) = load_credits(&state, movie_id, lang).await?;
    Ok(Json(DataResponse {
        data: Credits { cast, crew },
    }))
}

// ---------------------------------------------------------------------------
// Cast
// ---------------------------------------------------------------------------

/// POST /api/v1/movies/{id}/cast
pub async fn add_cast(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(movie_id): Path<DbId>,
    Json(mut input): Json<CreateCastCredit>,
) -> AppResult<(StatusCode, Json<DataResponse<CastCredit>>)> {
    normalize_texts("character name", &mut input.character_names)?;
    ensure_movie_exists(&state, movie_id).await?;

    let credit = CreditRepo::add_cast(&state.pool, movie_id, &input).await?;

    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_CREATE)
            .by(Some(user.user_id))
            .entity(entity_types::CAST_CREDIT, credit.id)
            .details(serde_json::json!({ "movie_id": movie_id, "person_id": credit.person_id })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: credit })))
}

/// PUT /api/v1/movies/{id}/cast/{cast_id}
pub async fn update_cast(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path((movie_id, cast_id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateCastCredit>,
) -> AppResult<Json<DataResponse<CastCredit>>> {
    if let Some(names) = input.character_names.as_mut() {
        normalize_texts("character name", names)?;
    }

    let credit = CreditRepo::update_cast(&state.pool, movie_id, cast_id, &input)
        .await?
        .ok_or_else(|| not_found("CastCredit", cast_id))?;

    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_UPDATE)
            .by(Some(user.user_id))
            .entity(entity_types::CAST_CREDIT, cast_id)
            .details(serde_json::json!({ "movie_id": movie_id })),
    )
    .await;

    Ok(Json(DataResponse { data: credit }))
}

/// DELETE /api/v1/movies/{id}/cast/{cast_id}
pub async fn remove_cast(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path((movie_id, cast_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !CreditRepo::remove_cast(&state.pool, movie_id, cast_id).await? {
        return Err(not_found("CastCredit", cast_id));
    }

    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_DELETE)
            .by(Some(user.user_id))
            .entity(entity_types::CAST_CREDIT, cast_id)
            .details(serde_json::json!({ "movie_id": movie_id })),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Crew
// ---------------------------------------------------------------------------

/// POST /api/v1/movies/{id}/crew
pub async fn add_crew(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(movie_id): Path<DbId>,
    Json(mut input): Json<CreateCrewCredit>,
) -> AppResult<(StatusCode, Json<DataResponse<CrewCredit>>)> {
    if input.department.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "department must not be empty".into(),
        )));
    }
    normalize_texts("job", &mut input.jobs)?;
    ensure_movie_exists(&state, movie_id).await?;

    let credit = CreditRepo::add_crew(&state.pool, movie_id, &input).await?;

    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_CREATE)
            .by(Some(user.user_id))
            .entity(entity_types::CREW_CREDIT, credit.id)
            .details(serde_json::json!({
                "movie_id": movie_id,
                "person_id": credit.person_id,
                "department": credit.department,
            })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: credit })))
}

/// PUT /api/v1/movies/{id}/crew/{crew_id}
pub async fn update_crew(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path((movie_id, crew_id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateCrewCredit>,
) -> AppResult<Json<DataResponse<CrewCredit>>> {
    if let Some(jobs) = input.jobs.as_mut() {
        normalize_texts("job", jobs)?;
    }

    let credit = CreditRepo::update_crew(&state.pool, movie_id, crew_id, &input)
        .await?
        .ok_or_else(|| not_found("CrewCredit", crew_id))?;

    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_UPDATE)
            .by(Some(user.user_id))
            .entity(entity_types::CREW_CREDIT, crew_id)
            .details(serde_json::json!({ "movie_id": movie_id })),
    )
    .await;

    Ok(Json(DataResponse { data: credit }))
}

/// DELETE /api/v1/movies/{id}/crew/{crew_id}
pub async fn remove_crew(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path((movie_id, crew_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !CreditRepo::remove_crew(&state.pool, movie_id, crew_id).await? {
        return Err(not_found("CrewCredit", crew_id));
    }

    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_DELETE)
            .by(Some(user.user_id))
            .entity(entity_types::CREW_CREDIT, crew_id)
            .details(serde_json::json!({ "movie_id": movie_id })),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
