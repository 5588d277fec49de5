//! Handlers for vendor contracts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use validator::Validate;

use veriguard_core::audit::actions;
use veriguard_core::error::CoreError;
use veriguard_core::permissions::Permission;
use veriguard_core::types::DbId;
use veriguard_db::models::contract::{Contract, CreateContract, UpdateContract};
use veriguard_db::repositories::ContractRepo;

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::handlers::vendors::ensure_vendor_exists;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_permission;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/contracts
pub async fn create_contract(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateContract>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::ContractCreate, org_id).await?;

    let details = json!({"vendor_id": input.vendor_id, "name": &input.name});
    let result = async {
        input.validate()?;
        if input.end_date <= input.start_date {
            return Err(AppError::Core(CoreError::Validation(
                "Contract end date must be after its start date".into(),
            )));
        }
        ensure_vendor_exists(&state, input.vendor_id, org_id).await?;
        Ok(ContractRepo::create(&state.pool, org_id, &input).await?)
    }
    .await;

    let contract = audit::finish(
        &state,
        Some(&auth),
        actions::CREATE,
        "contract",
        details,
        result,
        |c: &Contract| Some(c.id),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: contract })))
}

/// GET /api/v1/vendors/{vendor_id}/contracts
pub async fn list_for_vendor(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(vendor_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::ContractView, org_id).await?;

    ensure_vendor_exists(&state, vendor_id, org_id).await?;
    let contracts = ContractRepo::list_for_vendor(&state.pool, vendor_id, org_id).await?;
    Ok(Json(DataResponse { data: contracts }))
}

/// GET /api/v1/contracts/{contract_id}
pub async fn get_contract(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(contract_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::ContractView, org_id).await?;

    let contract = ContractRepo::find_scoped(&state.pool, contract_id, org_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Contract",
                id: contract_id,
            })
        })?;

    Ok(Json(DataResponse { data: contract }))
}

/// PATCH /api/v1/contracts/{contract_id}
pub async fn update_contract(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(contract_id): Path<DbId>,
    Json(input): Json<UpdateContract>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::ContractUpdate, org_id).await?;

    let details = json!({"fields": &input});
    let result = async {
        ContractRepo::update(&state.pool, contract_id, org_id, &input)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "Contract",
                    id: contract_id,
                })
            })
    }
    .await;

    let contract = audit::finish(
        &state,
        Some(&auth),
        actions::UPDATE,
        "contract",
        details,
        result,
        |c: &Contract| Some(c.id),
    )
    .await?;

    Ok(Json(DataResponse { data: contract }))
}
