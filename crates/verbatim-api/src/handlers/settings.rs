//! User settings handlers.

use axum::extract::State;
use axum::Json;

use verbatim_core::SettingsUpdate;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /settings — defaults when no record exists yet.
pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let settings = state.db.settings.get(user.id).await?;

    Ok(Json(match settings {
        Some(s) => serde_json::json!({
            "system_prompt_template": s.system_prompt_template,
            "default_user_prompt": s.default_user_prompt,
        }),
        None => serde_json::json!({
            "system_prompt_template": null,
            "default_user_prompt": null,
        }),
    }))
}

/// PUT /settings — full replacement of both fields.
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<SettingsUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let saved = state.db.settings.upsert(user.id, &req).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "settings": {
            "system_prompt_template": saved.system_prompt_template,
            "default_user_prompt": saved.default_user_prompt,
        },
    })))
}
