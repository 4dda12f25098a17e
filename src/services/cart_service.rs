use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{AddToCartRequest, CartList},
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        domain_extensions::{Column as ExtCol, Entity as DomainExtensions},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CartItem,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::convert::cart_item_from_entity,
    state::AppState,
};

pub async fn list_cart(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = CartItems::find().filter(CartCol::UserId.eq(user.user_id));
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .order_by_desc(CartCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(cart_item_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", CartList { items }, Some(meta)))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    let has_product_shape = payload.product_id.is_some();
    let has_domain_shape = payload.domain_name.is_some()
        || payload.extension.is_some()
        || payload.years.is_some();

    let item = match (has_product_shape, has_domain_shape) {
        (true, false) => add_product_line(state, user, &payload).await?,
        (false, true) => add_domain_line(state, user, &payload).await?,
        _ => {
            return Err(AppError::Validation(
                "cart item must be either a product or a domain registration".into(),
            ));
        }
    };

    log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "item_id": item.id, "kind": item.kind })),
    )
    .await;
    Ok(ApiResponse::success("OK", item, None))
}

async fn add_product_line(
    state: &AppState,
    user: &AuthUser,
    payload: &AddToCartRequest,
) -> AppResult<CartItem> {
    let product_id = payload.product_id.unwrap_or_default();
    let quantity = payload.quantity.unwrap_or(1);
    if quantity <= 0 {
        return Err(AppError::Validation(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product = Products::find()
        .filter(
            Condition::all()
                .add(ProdCol::Id.eq(product_id))
                .add(ProdCol::Active.eq(true)),
        )
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::Validation("product not found".to_string()));
    }

    let existing = CartItems::find()
        .filter(
            Condition::all()
                .add(CartCol::UserId.eq(user.user_id))
                .add(CartCol::ProductId.eq(product_id)),
        )
        .one(&state.orm)
        .await?;

    let model = if let Some(item) = existing {
        let mut active: CartActive = item.into();
        active.quantity = Set(quantity);
        active.update(&state.orm).await?
    } else {
        CartActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.user_id),
            kind: Set("product".into()),
            product_id: Set(Some(product_id)),
            domain_name: Set(None),
            extension: Set(None),
            years: Set(None),
            quantity: Set(quantity),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?
    };

    Ok(cart_item_from_entity(model))
}

async fn add_domain_line(
    state: &AppState,
    user: &AuthUser,
    payload: &AddToCartRequest,
) -> AppResult<CartItem> {
    let (Some(domain_name), Some(extension), Some(years)) = (
        payload.domain_name.as_ref(),
        payload.extension.as_ref(),
        payload.years,
    ) else {
        return Err(AppError::Validation(
            "domain lines need domain_name, extension and years".into(),
        ));
    };
    if domain_name.trim().is_empty() {
        return Err(AppError::Validation("domain name must not be empty".into()));
    }
    if years < 1 {
        return Err(AppError::Validation("years must be at least 1".into()));
    }

    let known = DomainExtensions::find()
        .filter(ExtCol::Name.eq(extension.as_str()))
        .one(&state.orm)
        .await?;
    if known.is_none() {
        return Err(AppError::Validation(format!(
            "unknown domain extension '{extension}'"
        )));
    }

    let existing = CartItems::find()
        .filter(
            Condition::all()
                .add(CartCol::UserId.eq(user.user_id))
                .add(CartCol::DomainName.eq(domain_name.clone()))
                .add(CartCol::Extension.eq(extension.clone())),
        )
        .one(&state.orm)
        .await?;

    let model = if let Some(item) = existing {
        let mut active: CartActive = item.into();
        active.years = Set(Some(years as i32));
        active.update(&state.orm).await?
    } else {
        CartActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.user_id),
            kind: Set("domain".into()),
            product_id: Set(None),
            domain_name: Set(Some(domain_name.clone())),
            extension: Set(Some(extension.clone())),
            years: Set(Some(years as i32)),
            // a domain registration is always a single unit
            quantity: Set(1),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?
    };

    Ok(cart_item_from_entity(model))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = CartItems::delete_many()
        .filter(
            Condition::all()
                .add(CartCol::Id.eq(item_id))
                .add(CartCol::UserId.eq(user.user_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "item_id": item_id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
