use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    currency,
    dto::domains::{DomainQuote, ExtensionList, QuoteQuery},
    entity::domain_extensions::{Column as ExtCol, Entity as DomainExtensions},
    error::{AppError, AppResult},
    pricing,
    response::{ApiResponse, Meta},
    services::convert::extension_from_entity,
    state::AppState,
};

pub async fn list_extensions(state: &AppState) -> AppResult<ApiResponse<ExtensionList>> {
    let items = DomainExtensions::find()
        .order_by_asc(ExtCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(extension_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Domain extensions",
        ExtensionList { items },
        Some(Meta::empty()),
    ))
}

/// Quote a multi-year registration for one extension.
pub async fn quote(state: &AppState, query: QuoteQuery) -> AppResult<ApiResponse<DomainQuote>> {
    if query.years < 1 {
        return Err(AppError::Validation(
            "years must be at least 1".to_string(),
        ));
    }

    let extension = DomainExtensions::find()
        .filter(ExtCol::Name.eq(query.extension.as_str()))
        .one(&state.orm)
        .await?;
    let extension = match extension {
        Some(e) => e,
        None => return Err(AppError::NotFound),
    };

    let total_price = pricing::multi_year_price(extension.base_price, query.years);
    let data = DomainQuote {
        extension: extension.name,
        years: query.years,
        base_price: extension.base_price,
        total_price,
        total_display: currency::format_kwanza(Some(total_price)),
    };

    Ok(ApiResponse::success("Quote", data, Some(Meta::empty())))
}
