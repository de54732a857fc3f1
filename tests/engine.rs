//! End-to-end engine behavior against the in-memory store: list contracts,
//! write-path invariants, derived fields, soft delete, and concurrency guards.

use hortica::{
    CatalogModel, CatalogService, CatalogStore, EngineError, EntityKind, MemoryStore,
};
use serde_json::{json, Value};
use std::collections::HashMap;

fn service() -> CatalogService<MemoryStore> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let model = CatalogModel::horticultural().expect("stock model");
    let store = MemoryStore::for_model(&model);
    CatalogService::new(model, store)
}

fn obj(v: Value) -> HashMap<String, Value> {
    v.as_object().unwrap().clone().into_iter().collect()
}

fn params(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn plant_payload(name: &str, purpose: &str) -> HashMap<String, Value> {
    obj(json!({
        "name": name,
        "category": "crop",
        "growthCycle": "annual",
        "growthHabit": "upright",
        "idealSeason": "summer",
        "purpose": purpose,
    }))
}

fn soil_payload(name: &str) -> HashMap<String, Value> {
    obj(json!({
        "name": name,
        "type": "loam",
        "texture": "medium",
        "drainage": "well_drained",
        "nutrientLevel": "high",
        "organicMatterLevel": "moderate",
        "waterRetentionLevel": "moderate",
    }))
}

fn field_errors(err: EngineError) -> Vec<(String, String)> {
    match err {
        EngineError::Validation(errors) => errors
            .into_iter()
            .map(|e| (e.field, e.message))
            .collect(),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn created_rows_carry_server_managed_fields_in_camel_case() {
    let svc = service();
    let row = svc
        .create(EntityKind::Plant, &plant_payload("Tomato", "culinary"))
        .await
        .unwrap();
    assert!(row["id"].as_str().is_some());
    assert_eq!(row["growthCycle"], json!("annual"));
    assert_eq!(row["version"], json!(1));
    assert!(row["createdAt"].as_str().is_some());
    assert!(row.get("growth_cycle").is_none());
}

#[tokio::test]
async fn duplicate_plant_name_is_a_conflict() {
    let svc = service();
    svc.create(EntityKind::Plant, &plant_payload("Tomato", "culinary"))
        .await
        .unwrap();
    let err = svc
        .create(EntityKind::Plant, &plant_payload("tomato", "culinary"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn list_paginates_with_exceeded_page_flag() {
    let svc = service();
    for i in 1..=12 {
        svc.create(
            EntityKind::Plant,
            &plant_payload(&format!("plant-{i:02}"), "culinary"),
        )
        .await
        .unwrap();
    }

    let page1 = svc.list(EntityKind::Plant, &params(&[])).await.unwrap();
    assert_eq!(page1.data.len(), 10);
    assert_eq!(page1.pagination.total_items, 12);
    assert_eq!(page1.pagination.total_pages, 2);
    assert!(!page1.pagination.has_previous_page);
    assert!(page1.pagination.has_next_page);
    assert_eq!(page1.data[0]["name"], json!("plant-01"));

    let page2 = svc
        .list(EntityKind::Plant, &params(&[("page", "2")]))
        .await
        .unwrap();
    assert_eq!(page2.data.len(), 2);
    assert!(page2.pagination.has_previous_page);
    assert!(!page2.pagination.has_next_page);
    assert_eq!(page2.pagination.has_exceeded_page, None);

    let beyond = svc
        .list(EntityKind::Plant, &params(&[("page", "9")]))
        .await
        .unwrap();
    assert!(beyond.data.is_empty());
    assert_eq!(beyond.pagination.has_exceeded_page, Some(true));
}

#[tokio::test]
async fn oversized_limit_clamps_and_reports() {
    let svc = service();
    svc.create(EntityKind::Plant, &plant_payload("Tomato", "culinary"))
        .await
        .unwrap();
    let page = svc
        .list(EntityKind::Plant, &params(&[("limit", "500")]))
        .await
        .unwrap();
    assert_eq!(page.pagination.page_size, 100);
    assert_eq!(page.pagination.max_limit_applied, Some(true));
}

#[tokio::test]
async fn unknown_sort_field_falls_back_and_filters_reject_bad_enum_values() {
    let svc = service();
    svc.create(EntityKind::Plant, &plant_payload("Basil", "culinary"))
        .await
        .unwrap();
    svc.create(EntityKind::Plant, &plant_payload("Yarrow", "medicinal"))
        .await
        .unwrap();

    let page = svc
        .list(EntityKind::Plant, &params(&[("sort_by", "unknown_field")]))
        .await
        .unwrap();
    assert_eq!(page.data[0]["name"], json!("Basil"));

    let filtered = svc
        .list(EntityKind::Plant, &params(&[("purpose", "medicinal")]))
        .await
        .unwrap();
    assert_eq!(filtered.pagination.total_items, 1);
    assert_eq!(filtered.data[0]["name"], json!("Yarrow"));

    let err = svc
        .list(EntityKind::Plant, &params(&[("purpose", "not_a_purpose")]))
        .await
        .unwrap_err();
    let errors = field_errors(err);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "purpose");
    assert!(errors[0].1.starts_with("purpose must be one of: culinary"));
}

#[tokio::test]
async fn soil_ph_type_is_derived_and_tracks_partial_updates() {
    let svc = service();
    let mut payload = soil_payload("meadow loam");
    payload.insert("phMin".into(), json!(5.5));
    payload.insert("phMax".into(), json!(6.5));
    // Client-supplied phType must be ignored.
    payload.insert("phType".into(), json!("alkaline"));

    let soil = svc.create(EntityKind::Soil, &payload).await.unwrap();
    assert_eq!(soil["phType"], json!("acidic"));
    let id = soil["id"].as_str().unwrap().to_string();

    // Patching only the upper bound revalidates and rederives against the
    // stored lower bound.
    let err = svc
        .patch(EntityKind::Soil, &id, &obj(json!({"phMax": 4.0})))
        .await
        .unwrap_err();
    let errors = field_errors(err);
    assert_eq!(errors[0], ("ph_max".to_string(), "ph_max is lesser than ph_min".to_string()));

    let updated = svc
        .patch(EntityKind::Soil, &id, &obj(json!({"phMax": 8.0})))
        .await
        .unwrap();
    assert_eq!(updated["phType"], json!("alkaline"));
    assert_eq!(updated["version"], json!(2));
}

#[tokio::test]
async fn stale_concurrent_update_is_rejected() {
    let svc = service();
    let soil = svc
        .create(EntityKind::Soil, &soil_payload("meadow loam"))
        .await
        .unwrap();
    let id = soil["id"].as_str().unwrap().to_string();

    // First writer lands and bumps the version.
    svc.patch(EntityKind::Soil, &id, &obj(json!({"description": "first"})))
        .await
        .unwrap();

    // Second writer validated against the original version and must not win.
    let changes: HashMap<String, Value> = obj(json!({"description": "second"}));
    let err = svc
        .store()
        .update(EntityKind::Soil, &id, &changes, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn growth_stage_day_range_checked_on_create_and_patch() {
    let svc = service();
    let err = svc
        .create(
            EntityKind::GrowthStage,
            &obj(json!({"name": "seedling", "order": 2, "minDays": 10, "maxDays": 5})),
        )
        .await
        .unwrap_err();
    let errors = field_errors(err);
    assert_eq!(errors[0].1, "min_days is greater than max_days");

    let stage = svc
        .create(
            EntityKind::GrowthStage,
            &obj(json!({"name": "seedling", "order": 2, "minDays": 10, "maxDays": 20})),
        )
        .await
        .unwrap();
    let id = stage["id"].as_str().unwrap().to_string();

    let err = svc
        .patch(EntityKind::GrowthStage, &id, &obj(json!({"maxDays": 3})))
        .await
        .unwrap_err();
    let errors = field_errors(err);
    assert_eq!(errors[0], ("max_days".to_string(), "max_days is lesser than min_days".to_string()));

    let updated = svc
        .patch(EntityKind::GrowthStage, &id, &obj(json!({"maxDays": 25})))
        .await
        .unwrap();
    assert_eq!(updated["maxDays"], json!(25));
}

#[tokio::test]
async fn soft_deleted_taxonomy_hidden_from_default_listing() {
    let svc = service();
    let insect = svc
        .create(EntityKind::PestType, &obj(json!({"name": "insect"})))
        .await
        .unwrap();
    svc.create(EntityKind::PestType, &obj(json!({"name": "mite"})))
        .await
        .unwrap();
    let id = insect["id"].as_str().unwrap().to_string();

    svc.delete(EntityKind::PestType, &id).await.unwrap();

    let visible = svc.list(EntityKind::PestType, &params(&[])).await.unwrap();
    assert_eq!(visible.pagination.total_items, 1);
    assert_eq!(visible.data[0]["name"], json!("mite"));

    let all = svc
        .list(EntityKind::PestType, &params(&[("includeInactive", "true")]))
        .await
        .unwrap();
    assert_eq!(all.pagination.total_items, 2);

    // Reads follow the same visibility rule.
    assert!(matches!(
        svc.get(EntityKind::PestType, &id, false).await,
        Err(EngineError::NotFound(_))
    ));
    let row = svc.get(EntityKind::PestType, &id, true).await.unwrap();
    assert_eq!(row["isActive"], json!(false));

    // Deleting an already inactive record is NotFound, not a no-op.
    assert!(matches!(
        svc.delete(EntityKind::PestType, &id).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn hard_delete_is_not_idempotent() {
    let svc = service();
    let plant = svc
        .create(EntityKind::Plant, &plant_payload("Tomato", "culinary"))
        .await
        .unwrap();
    let id = plant["id"].as_str().unwrap().to_string();

    svc.delete(EntityKind::Plant, &id).await.unwrap();
    assert!(matches!(
        svc.delete(EntityKind::Plant, &id).await,
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        svc.get(EntityKind::Plant, &id, false).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn pest_requires_a_resolvable_pest_type() {
    let svc = service();
    let err = svc
        .create(
            EntityKind::Pest,
            &obj(json!({
                "name": "Aphid",
                "seasonality": "spring",
                "pestTypeId": "missing-id",
            })),
        )
        .await
        .unwrap_err();
    let errors = field_errors(err);
    assert_eq!(
        errors[0],
        (
            "pest_type_id".to_string(),
            "pest_type_id does not reference a known pest type".to_string()
        )
    );

    let pest_type = svc
        .create(EntityKind::PestType, &obj(json!({"name": "insect"})))
        .await
        .unwrap();
    let type_id = pest_type["id"].as_str().unwrap();
    let pest = svc
        .create(
            EntityKind::Pest,
            &obj(json!({
                "name": "Aphid",
                "seasonality": "spring",
                "pestTypeId": type_id,
            })),
        )
        .await
        .unwrap();
    assert_eq!(pest["pestTypeId"], json!(type_id));

    // A soft-deleted target no longer resolves.
    svc.delete(EntityKind::PestType, type_id).await.unwrap();
    let err = svc
        .create(
            EntityKind::Pest,
            &obj(json!({
                "name": "Whitefly",
                "seasonality": "summer",
                "pestTypeId": type_id,
            })),
        )
        .await
        .unwrap_err();
    assert!(!field_errors(err).is_empty());
}

#[tokio::test]
async fn patch_with_no_patchable_fields_is_rejected() {
    let svc = service();
    let soil = svc
        .create(EntityKind::Soil, &soil_payload("meadow loam"))
        .await
        .unwrap();
    let id = soil["id"].as_str().unwrap().to_string();
    let err = svc
        .patch(EntityKind::Soil, &id, &obj(json!({"phType": "acidic", "version": 99})))
        .await
        .unwrap_err();
    let errors = field_errors(err);
    assert_eq!(errors[0].1, "no patchable fields in payload");
}

#[tokio::test]
async fn create_aggregates_every_violation() {
    let svc = service();
    let err = svc
        .create(
            EntityKind::Plant,
            &obj(json!({
                "name": "a plant name that is far too long",
                "category": "tree",
                "growthCycle": "annual",
                "growthHabit": "upright",
                "idealSeason": "summer",
                "purpose": "culinary",
                "tags": ["", "  "],
            })),
        )
        .await
        .unwrap_err();
    let errors = field_errors(err);
    let fields: Vec<&str> = errors.iter().map(|(f, _)| f.as_str()).collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"category"));
    assert!(fields.contains(&"tags"));
}
