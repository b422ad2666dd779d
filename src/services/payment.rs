// src/services/payment.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::common::error::AppError;

// O que o gateway nos devolve. Só carregamos o que usamos.

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayCustomer {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySubscription {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoletoCharge {
    pub id: String,
    pub boleto_url: String,
}

/// A costura com o gateway de pagamento. Falha do gateway é falha para o
/// chamador: nunca existe caminho que "simula sucesso" e marca algo como
/// pago sem confirmação.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_customer(&self, name: &str, email: &str)
    -> Result<GatewayCustomer, AppError>;

    async fn create_subscription(
        &self,
        customer_id: &str,
        plan_name: &str,
        monthly_price: Decimal,
    ) -> Result<GatewaySubscription, AppError>;

    async fn create_boleto(
        &self,
        customer_name: &str,
        customer_email: &str,
        amount: Decimal,
        description: &str,
        instructions: Option<&str>,
    ) -> Result<BoletoCharge, AppError>;
}

// Implementação HTTP real (API REST do gateway)
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpPaymentGateway {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::PaymentGateway(format!("{} indisponível: {}", path, e)))?;

        let response = response
            .error_for_status()
            .map_err(|e| AppError::PaymentGateway(format!("{} recusou: {}", path, e)))?;

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::PaymentGateway(format!("resposta inválida de {}: {}", path, e)))
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_customer(
        &self,
        name: &str,
        email: &str,
    ) -> Result<GatewayCustomer, AppError> {
        self.post(
            "/customers",
            json!({ "name": name, "email": email }),
        )
        .await
    }

    async fn create_subscription(
        &self,
        customer_id: &str,
        plan_name: &str,
        monthly_price: Decimal,
    ) -> Result<GatewaySubscription, AppError> {
        self.post(
            "/subscriptions",
            json!({
                "customerId": customer_id,
                "plan": plan_name,
                "amount": monthly_price,
                "cycle": "MONTHLY",
            }),
        )
        .await
    }

    async fn create_boleto(
        &self,
        customer_name: &str,
        customer_email: &str,
        amount: Decimal,
        description: &str,
        instructions: Option<&str>,
    ) -> Result<BoletoCharge, AppError> {
        self.post(
            "/charges/boleto",
            json!({
                "customer": { "name": customer_name, "email": customer_email },
                "amount": amount,
                "description": description,
                "instructions": instructions,
            }),
        )
        .await
    }
}
