//! Handlers for the `/people` resource.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use lao_cinema_core::audit::{action_types, entity_types};
use lao_cinema_core::error::CoreError;
use lao_cinema_core::locale::{pick, Language};
use lao_cinema_core::types::DbId;
use lao_cinema_core::validation::validate_media_path;
use lao_cinema_db::models::person::{
    CreatePerson, Person, PersonCredit, PersonTranslation, UpdatePerson, UpsertPersonTranslation,
};
use lao_cinema_db::repositories::PersonRepo;
use serde::{Deserialize, Serialize};

use super::not_found;
use crate::audit::{self, AuditEntry};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireEditor;
use crate::middleware::viewer::Viewer;
use crate::query::{LangParams, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PeopleListParams {
    /// Case-insensitive name search.
    pub q: Option<String>,
    pub lang: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PersonListItem {
    #[serde(flatten)]
    pub person: Person,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PersonDetail {
    #[serde(flatten)]
    pub person: Person,
    pub name: Option<String>,
    pub biography: Option<String>,
    pub translations: Vec<PersonTranslation>,
}

fn validate_person(profile_path: Option<&str>) -> AppResult<()> {
    if let Some(path) = profile_path {
        validate_media_path(path)?;
    }
    Ok(())
}

/// GET /api/v1/people
pub async fn list_people(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PeopleListParams>,
) -> AppResult<Json<DataResponse<Vec<PersonListItem>>>> {
    let lang = LangParams {
        lang: params.lang.clone(),
    }
    .resolve(&headers)?;
    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let search = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let people = PersonRepo::list(&state.pool, search, page.limit(), page.offset()).await?;
    let ids: Vec<DbId> = people.iter().map(|p| p.id).collect();
    let mut names: HashMap<DbId, Vec<PersonTranslation>> = HashMap::new();
    for t in PersonRepo::translations_for(&state.pool, &ids).await? {
        names.entry(t.person_id).or_default().push(t);
    }

    let items = people
        .into_iter()
        .map(|person| {
            let name = names
                .get(&person.id)
                .and_then(|ts| pick(ts, lang))
                .map(|t| t.name.clone());
            PersonListItem { person, name }
        })
        .collect();
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/people/{id}
pub async fn get_person(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<DbId>,
    Query(lang): Query<LangParams>,
) -> AppResult<Json<DataResponse<PersonDetail>>> {
    let lang = lang.resolve(&headers)?;
    let person = PersonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Person", id))?;
    let translations = PersonRepo::translations(&state.pool, id).await?;

    let display = pick(&translations, lang);
    Ok(Json(DataResponse {
        data: PersonDetail {
            name: display.map(|t| t.name.clone()),
            biography: display.and_then(|t| t.biography.clone()),
            person,
            translations,
        },
    }))
}

/// GET /api/v1/people/{id}/credits
///
/// Filmography. Credits on unpublished movies are visible to editors only.
pub async fn person_credits(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<PersonCredit>>>> {
    PersonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Person", id))?;
    let credits = PersonRepo::credits(&state.pool, id, viewer.can_edit()).await?;
    Ok(Json(DataResponse { data: credits }))
}

/// POST /api/v1/people
pub async fn create_person(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Json(input): Json<CreatePerson>,
) -> AppResult<(StatusCode, Json<DataResponse<Person>>)> {
    validate_person(input.profile_path.as_deref())?;

    let person = PersonRepo::create(&state.pool, &input).await?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_CREATE)
            .by(Some(user.user_id))
            .entity(entity_types::PERSON, person.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: person })))
}

/// PUT /api/v1/people/{id}
pub async fn update_person(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePerson>,
) -> AppResult<Json<DataResponse<Person>>> {
    validate_person(input.profile_path.as_deref())?;

    let person = PersonRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("Person", id))?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_UPDATE)
            .by(Some(user.user_id))
            .entity(entity_types::PERSON, id),
    )
    .await;

    Ok(Json(DataResponse { data: person }))
}

/// DELETE /api/v1/people/{id}
///
/// Removes the person's credits with them.
pub async fn delete_person(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !PersonRepo::delete(&state.pool, id).await? {
        return Err(not_found("Person", id));
    }
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_DELETE)
            .by(Some(user.user_id))
            .entity(entity_types::PERSON, id),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/people/{id}/translations/{lang}
pub async fn upsert_translation(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path((id, lang)): Path<(DbId, String)>,
    Json(input): Json<UpsertPersonTranslation>,
) -> AppResult<Json<DataResponse<PersonTranslation>>> {
    let language = Language::parse(&lang)?;
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".into(),
        )));
    }
    PersonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Person", id))?;

    let translation =
        PersonRepo::upsert_translation(&state.pool, id, language.code(), &input).await?;
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::ENTITY_UPDATE)
            .by(Some(user.user_id))
            .entity(entity_types::PERSON, id)
            .details(serde_json::json!({ "translation": language.code() })),
    )
    .await;

    Ok(Json(DataResponse { data: translation }))
}
