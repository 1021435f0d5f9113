use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub coupon_id: Uuid,
    pub is_used: bool,
    pub used_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::discount_coupons::Entity",
        from = "Column::CouponId",
        to = "super::discount_coupons::Column::Id",
        on_delete = "Cascade"
    )]
    DiscountCoupons,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::discount_coupons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiscountCoupons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
