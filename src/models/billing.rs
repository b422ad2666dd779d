// src/models/billing.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "batch_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Open,    // Agrupado, sem cobrança emitida
    Charged, // Boleto emitido, aguardando pagamento
    Paid,    // Quitado (confirmado via webhook)
    Failed,  // Gateway reportou falha na cobrança
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "commission_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "discount_kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    Percent,
    Fixed,
}

// --- Structs ---

// Lote de faturamento: os trabalhos concluídos de um cliente no período,
// agrupados para virar um boleto só.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillingBatch {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub client_user_id: Uuid,

    pub period_start: NaiveDate,
    pub period_end: NaiveDate,

    #[schema(example = "1350.00")]
    pub total: Decimal,
    pub status: BatchStatus,

    pub boleto_url: Option<String>,
    pub gateway_charge_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Comissão devida a um colaborador por um item de trabalho concluído
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRecord {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub job_item_id: Uuid,

    #[schema(example = "13.00")]
    pub amount: Decimal,
    pub status: CommissionStatus,
    pub paid_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

// Cupom de desconto (coleção global, chaveada por código)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    #[schema(example = "BEMVINDO20")]
    pub code: String,
    pub kind: DiscountKind,
    #[schema(example = "20.00")]
    pub value: Decimal,
    pub max_uses: i32,
    pub used_count: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// Por que um cupom foi recusado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponRejection {
    Exhausted,
    NotYetValid,
    Expired,
    Inactive,
}

impl Coupon {
    /// Um cupom esgotado, fora da janela de validade ou desativado nunca
    /// é considerado válido.
    pub fn check_valid(&self, now: DateTime<Utc>) -> Result<(), CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::Inactive);
        }
        if self.used_count >= self.max_uses {
            return Err(CouponRejection::Exhausted);
        }
        if now < self.valid_from {
            return Err(CouponRejection::NotYetValid);
        }
        if now > self.valid_until {
            return Err(CouponRejection::Expired);
        }
        Ok(())
    }

    /// Aplica o desconto sobre um preço, nunca abaixo de zero.
    pub fn apply(&self, price: Decimal) -> Decimal {
        let discounted = match self.kind {
            DiscountKind::Percent => {
                price - (price * self.value / Decimal::ONE_HUNDRED).round_dp(2)
            }
            DiscountKind::Fixed => price - self.value,
        };
        discounted.max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(kind: DiscountKind, value: Decimal) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: Uuid::new_v4(),
            code: "TESTE".to_string(),
            kind,
            value,
            max_uses: 10,
            used_count: 0,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(30),
            is_active: true,
            created_at: now,
        }
    }

    #[test]
    fn exhausted_coupon_never_validates() {
        let mut c = coupon(DiscountKind::Percent, Decimal::from(10));
        c.used_count = c.max_uses;
        assert_eq!(c.check_valid(Utc::now()), Err(CouponRejection::Exhausted));
    }

    #[test]
    fn coupon_outside_window_never_validates() {
        let c = coupon(DiscountKind::Percent, Decimal::from(10));

        let before = c.valid_from - Duration::hours(1);
        assert_eq!(c.check_valid(before), Err(CouponRejection::NotYetValid));

        let after = c.valid_until + Duration::hours(1);
        assert_eq!(c.check_valid(after), Err(CouponRejection::Expired));
    }

    #[test]
    fn inactive_coupon_never_validates() {
        let mut c = coupon(DiscountKind::Fixed, Decimal::from(10));
        c.is_active = false;
        assert_eq!(c.check_valid(Utc::now()), Err(CouponRejection::Inactive));
    }

    #[test]
    fn coupon_within_window_validates() {
        let c = coupon(DiscountKind::Percent, Decimal::from(10));
        assert!(c.check_valid(Utc::now()).is_ok());
    }

    #[test]
    fn percent_discount_math() {
        let c = coupon(DiscountKind::Percent, Decimal::from(20));
        // 20% de R$199,90 => R$159,92
        assert_eq!(c.apply(Decimal::new(19990, 2)), Decimal::new(15992, 2));
    }

    #[test]
    fn fixed_discount_never_goes_negative() {
        let c = coupon(DiscountKind::Fixed, Decimal::from(300));
        assert_eq!(c.apply(Decimal::new(19990, 2)), Decimal::ZERO);
    }
}
