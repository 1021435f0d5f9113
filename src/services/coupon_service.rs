use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, sea_query::Expr,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::coupons::{CouponValidation, CreateCouponRequest, ValidateCouponQuery},
    entity::{
        discount_coupons::{self, Column as CouponCol, Entity as DiscountCoupons},
        user_coupons::{self, Column as UserCouponCol, Entity as UserCoupons},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Coupon,
    pricing,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn format_money(cents: i64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Look up a coupon for this user and order, returning it with the discount it
/// grants. Every refusal is a `BadRequest` carrying the reason. The coupon row
/// is locked for the rest of the caller's transaction.
pub async fn resolve_coupon<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    code: &str,
    subtotal: i64,
    order_total: i64,
) -> AppResult<(discount_coupons::Model, i64)> {
    let coupon = DiscountCoupons::find()
        .filter(CouponCol::Code.eq(normalize_code(code)))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| AppError::bad_request("Invalid coupon code"))?;

    if !coupon.can_be_used(Utc::now()) {
        return Err(AppError::bad_request(
            "Coupon is expired or no longer available",
        ));
    }
    if subtotal < coupon.min_order_amount {
        return Err(AppError::bad_request(format!(
            "Order subtotal must be at least {}",
            format_money(coupon.min_order_amount)
        )));
    }

    let already_used = UserCoupons::find()
        .filter(UserCouponCol::UserId.eq(user_id))
        .filter(UserCouponCol::CouponId.eq(coupon.id))
        .filter(UserCouponCol::IsUsed.eq(true))
        .one(conn)
        .await?
        .is_some();
    if already_used {
        return Err(AppError::bad_request("Coupon already used"));
    }

    let kind = coupon
        .discount_kind()
        .ok_or_else(|| AppError::bad_request("Invalid coupon code"))?;
    let discount =
        pricing::coupon_discount(kind, subtotal, order_total, coupon.max_discount_amount);
    Ok((coupon, discount))
}

/// Count one use of the coupon and remember that this user spent it.
pub async fn record_usage<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    coupon_id: Uuid,
) -> AppResult<()> {
    let updated = DiscountCoupons::update_many()
        .col_expr(
            CouponCol::UsedCount,
            Expr::col(CouponCol::UsedCount).add(1),
        )
        .filter(CouponCol::Id.eq(coupon_id))
        .filter(
            Condition::any()
                .add(CouponCol::UsageLimit.is_null())
                .add(Expr::col(CouponCol::UsedCount).lt(Expr::col(CouponCol::UsageLimit))),
        )
        .exec(conn)
        .await?;
    if updated.rows_affected == 0 {
        return Err(AppError::bad_request(
            "Coupon is expired or no longer available",
        ));
    }

    let now = Utc::now();
    user_coupons::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        coupon_id: Set(coupon_id),
        is_used: Set(true),
        used_at: Set(Some(now.into())),
        created_at: Set(now.into()),
    }
    .insert(conn)
    .await?;
    Ok(())
}

pub async fn create_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let code = normalize_code(&payload.code);
    let exists = DiscountCoupons::find()
        .filter(CouponCol::Code.eq(code.as_str()))
        .one(&state.orm)
        .await?
        .is_some();
    if exists {
        return Err(AppError::bad_request(format!("Coupon '{code}' already exists")));
    }

    let now = Utc::now();
    let coupon = discount_coupons::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        description: Set(payload.description),
        discount_type: Set(payload.discount_type.as_str().to_string()),
        discount_value: Set(payload.discount_value),
        min_order_amount: Set(payload.min_order_amount),
        max_discount_amount: Set(payload.max_discount_amount),
        usage_limit: Set(payload.usage_limit),
        used_count: Set(0),
        is_active: Set(payload.is_active),
        valid_from: Set(payload.valid_from.into()),
        valid_to: Set(payload.valid_to.into()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "coupon_create",
        Some("discount_coupons"),
        Some(serde_json::json!({ "coupon_id": coupon.id, "code": coupon.code })),
    )
    .await;

    Ok(ApiResponse::success(
        "Coupon created",
        Coupon::from(coupon),
        Some(Meta::empty()),
    ))
}

pub async fn list_coupons(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Vec<Coupon>>> {
    ensure_admin(user)?;
    let items: Vec<Coupon> = DiscountCoupons::find()
        .order_by_desc(CouponCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Coupon::from)
        .collect();
    Ok(ApiResponse::success("Coupons", items, Some(Meta::empty())))
}

/// Dry run of the checkout coupon rules against a subtotal.
pub async fn validate_coupon(
    state: &AppState,
    user: &AuthUser,
    query: ValidateCouponQuery,
) -> AppResult<ApiResponse<CouponValidation>> {
    query.validate()?;
    let subtotal = query.subtotal;
    let order_total = subtotal + pricing::tax_for(subtotal) + pricing::shipping_for(subtotal);

    let validation =
        match resolve_coupon(&state.orm, user.user_id, &query.code, subtotal, order_total).await {
            Ok((_, discount_amount)) => CouponValidation {
                valid: true,
                discount_amount,
                message: "Coupon applied".into(),
            },
            Err(AppError::BadRequest(message)) => CouponValidation {
                valid: false,
                discount_amount: 0,
                message,
            },
            Err(err) => return Err(err),
        };

    Ok(ApiResponse::success(
        "Coupon validation",
        validation,
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_case_insensitive() {
        assert_eq!(normalize_code("  save10 "), "SAVE10");
    }

    #[test]
    fn money_is_formatted_in_dollars() {
        assert_eq!(format_money(5000), "$50.00");
        assert_eq!(format_money(1205), "$12.05");
    }
}
