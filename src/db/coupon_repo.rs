// src/db/coupon_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::billing::{Coupon, DiscountKind},
};

// Cupons são coleção global: sem organization_id, sem RLS.
#[derive(Clone)]
pub struct CouponRepository {
    pool: PgPool,
}

impl CouponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        code: &str,
        kind: DiscountKind,
        value: Decimal,
        max_uses: i32,
        valid_from: chrono::DateTime<chrono::Utc>,
        valid_until: chrono::DateTime<chrono::Utc>,
    ) -> Result<Coupon, AppError> {
        sqlx::query_as::<_, Coupon>(
            r#"
            INSERT INTO coupons (code, kind, value, max_uses, valid_from, valid_until)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(code)
        .bind(kind)
        .bind(value)
        .bind(max_uses)
        .bind(valid_from)
        .bind(valid_until)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Já existe um cupom com esse código.".into(),
                    );
                }
            }
            e.into()
        })
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, AppError> {
        let coupon = sqlx::query_as::<_, Coupon>("SELECT * FROM coupons WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(coupon)
    }

    pub async fn list(&self) -> Result<Vec<Coupon>, AppError> {
        let coupons = sqlx::query_as::<_, Coupon>("SELECT * FROM coupons ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(coupons)
    }

    // Incremento atômico com guarda: duas assinaturas disputando o último
    // uso não estouram o limite: uma delas recebe None.
    pub async fn redeem(&self, code: &str) -> Result<Option<Coupon>, AppError> {
        let coupon = sqlx::query_as::<_, Coupon>(
            r#"
            UPDATE coupons
            SET used_count = used_count + 1
            WHERE code = $1 AND is_active AND used_count < max_uses
            RETURNING *
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    pub async fn deactivate(&self, code: &str) -> Result<Option<Coupon>, AppError> {
        let coupon = sqlx::query_as::<_, Coupon>(
            "UPDATE coupons SET is_active = FALSE WHERE code = $1 RETURNING *",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }
}
