//! Audit logging constants.

/// Known action types for audit log entries.
pub mod action_types {
    pub const LOGIN: &str = "login";
    pub const REGISTER: &str = "register";
    pub const ENTITY_CREATE: &str = "entity_create";
    pub const ENTITY_UPDATE: &str = "entity_update";
    pub const ENTITY_DELETE: &str = "entity_delete";
    pub const ROLE_CHANGE: &str = "role_change";
    pub const RENTAL_CREATE: &str = "rental_create";
    pub const RENTAL_MIGRATE: &str = "rental_migrate";
    pub const HOMEPAGE_UPDATE: &str = "homepage_update";
}

/// Entity type names recorded in `audit_logs.entity_type`.
pub mod entity_types {
    pub const MOVIE: &str = "movie";
    pub const MOVIE_IMAGE: &str = "movie_image";
    pub const PERSON: &str = "person";
    pub const CAST_CREDIT: &str = "cast_credit";
    pub const CREW_CREDIT: &str = "crew_credit";
    pub const GENRE: &str = "genre";
    pub const PRODUCTION_COMPANY: &str = "production_company";
    pub const TRAILER: &str = "trailer";
    pub const SHORT_PACK: &str = "short_pack";
    pub const AWARD_SHOW: &str = "award_show";
    pub const AWARD_CATEGORY: &str = "award_category";
    pub const AWARD_NOMINATION: &str = "award_nomination";
    pub const RENTAL: &str = "rental";
    pub const USER: &str = "user";
    pub const HOMEPAGE: &str = "homepage";
}

/// Build a field-level change summary `{field: {"from": .., "to": ..}}`
/// for two JSON objects, listing only keys whose values differ.
pub fn diff_fields(before: &serde_json::Value, after: &serde_json::Value) -> serde_json::Value {
    let (Some(before), Some(after)) = (before.as_object(), after.as_object()) else {
        return serde_json::json!({ "from": before, "to": after });
    };

    let mut changes = serde_json::Map::new();
    for (key, new_value) in after {
        if matches!(key.as_str(), "updated_at" | "created_at") {
            continue;
        }
        let old_value = before.get(key).unwrap_or(&serde_json::Value::Null);
        if old_value != new_value {
            changes.insert(
                key.clone(),
                serde_json::json!({ "from": old_value, "to": new_value }),
            );
        }
    }
    serde_json::Value::Object(changes)
}
