use crate::{
    types::{OptionItem, Result},
    AppState,
};
use axum::{extract::State, Json};

/// Security levels in dropdown order. Each entry maps a cylinder range found
/// in the catalog to its user-facing code and label; ranges without a mapping
/// are dropped.
const SECURITY_LEVELS: &[(&str, &str, &str)] = &[
    ("OCTAL", "Octal", "Level 1: Octal"),
    ("SERIAL", "Serial", "Level 2: Serial (not copy-protected)"),
    ("SERIAL S", "Serial S", "Level 3: Serial S (not copy-protected)"),
    ("TERTIAL", "Tertial", "Level 4: Tertial"),
    ("SERIAL XP", "Serial XP", "Level 5: Serial XP"),
    ("DUAL XP S2", "Dual XP S2", "Level 6: Dual XP S2"),
];

/// Security levels available for new projects, derived from the distinct
/// cylinder ranges present in the catalog.
#[utoipa::path(
    get,
    path = "/api/security-levels",
    responses(
        (status = 200, description = "Available security levels", body = Vec<OptionItem>)
    ),
    tag = "options"
)]
pub async fn security_levels(State(state): State<AppState>) -> Result<Json<Vec<OptionItem>>> {
    let ranges = state.store.distinct_cylinder_ranges().await?;

    let levels: Vec<OptionItem> = SECURITY_LEVELS
        .iter()
        .filter(|(gamme, _, _)| ranges.iter().any(|r| r == gamme))
        .map(|(_, code, label)| OptionItem {
            code: code.to_string(),
            label: label.to_string(),
        })
        .collect();

    Ok(Json(levels))
}

/// Static organigramme (keying chart) type list.
#[utoipa::path(
    get,
    path = "/api/organigramme-types",
    responses(
        (status = 200, description = "Organigramme types", body = Vec<OptionItem>)
    ),
    tag = "options"
)]
pub async fn organigramme_types() -> Json<Vec<OptionItem>> {
    Json(vec![
        OptionItem {
            code: "pg".to_string(),
            label: "PG (General master key)".to_string(),
        },
        OptionItem {
            code: "im".to_string(),
            label: "IM (Building)".to_string(),
        },
        OptionItem {
            code: "pg + im".to_string(),
            label: "PG + IM (General master key + Building)".to_string(),
        },
    ])
}
