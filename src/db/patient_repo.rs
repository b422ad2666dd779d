// src/db/patient_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::patients::{Appointment, Patient},
};

#[derive(Clone)]
pub struct PatientRepository {
    pool: PgPool,
}

impl PatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Pacientes ---

    pub async fn create(
        &self,
        organization_id: Uuid,
        full_name: &str,
        document: Option<&str>,
        phone: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Patient, AppError> {
        let patient = sqlx::query_as::<_, Patient>(
            r#"
            INSERT INTO patients (organization_id, full_name, document, phone, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(full_name)
        .bind(document)
        .bind(phone)
        .bind(notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(patient)
    }

    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<Patient>, AppError> {
        let patients = sqlx::query_as::<_, Patient>(
            "SELECT * FROM patients WHERE organization_id = $1 ORDER BY full_name",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(patients)
    }

    pub async fn update(
        &self,
        organization_id: Uuid,
        patient_id: Uuid,
        full_name: Option<&str>,
        document: Option<&str>,
        phone: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Option<Patient>, AppError> {
        let patient = sqlx::query_as::<_, Patient>(
            r#"
            UPDATE patients
            SET full_name = COALESCE($3, full_name),
                document  = COALESCE($4, document),
                phone     = COALESCE($5, phone),
                notes     = COALESCE($6, notes),
                updated_at = NOW()
            WHERE organization_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(patient_id)
        .bind(full_name)
        .bind(document)
        .bind(phone)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(patient)
    }

    pub async fn delete(&self, organization_id: Uuid, patient_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM patients WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(patient_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // --- Agendamentos ---

    pub async fn create_appointment(
        &self,
        organization_id: Uuid,
        patient_id: Uuid,
        scheduled_at: DateTime<Utc>,
        description: &str,
    ) -> Result<Appointment, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (organization_id, patient_id, scheduled_at, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(patient_id)
        .bind(scheduled_at)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(appointment)
    }

    pub async fn list_appointments(
        &self,
        organization_id: Uuid,
        patient_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, AppError> {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR patient_id = $2)
            ORDER BY scheduled_at
            "#,
        )
        .bind(organization_id)
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    pub async fn set_appointment_done(
        &self,
        organization_id: Uuid,
        appointment_id: Uuid,
        is_done: bool,
    ) -> Result<Option<Appointment>, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments SET is_done = $3
            WHERE organization_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(appointment_id)
        .bind(is_done)
        .fetch_optional(&self.pool)
        .await?;

        Ok(appointment)
    }
}
