//! Repository for the `vendor_assessments` table.

use sqlx::PgPool;
use veriguard_core::types::{DbId, Timestamp};

use crate::models::assessment::VendorAssessment;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organization_id, vendor_id, assessment_type, status, due_date, \
    completed_at, overall_score, recommendations, created_at, updated_at";

/// Provides CRUD operations for vendor assessments.
pub struct AssessmentRepo;

impl AssessmentRepo {
    /// Insert a new assessment, returning the created row.
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        vendor_id: DbId,
        assessment_type: &str,
        status: &str,
        due_date: Option<Timestamp>,
    ) -> Result<VendorAssessment, sqlx::Error> {
        let query = format!(
            "INSERT INTO vendor_assessments
                (organization_id, vendor_id, assessment_type, status, due_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VendorAssessment>(&query)
            .bind(organization_id)
            .bind(vendor_id)
            .bind(assessment_type)
            .bind(status)
            .bind(due_date)
            .fetch_one(pool)
            .await
    }

    /// Find an assessment by ID within an organization.
    pub async fn find_scoped(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<VendorAssessment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vendor_assessments WHERE id = $1 AND organization_id = $2"
        );
        sqlx::query_as::<_, VendorAssessment>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// List a vendor's assessments, newest first.
    pub async fn list_for_vendor(
        pool: &PgPool,
        vendor_id: DbId,
        organization_id: DbId,
    ) -> Result<Vec<VendorAssessment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vendor_assessments
             WHERE vendor_id = $1 AND organization_id = $2
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, VendorAssessment>(&query)
            .bind(vendor_id)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Move an assessment to a new status (already validated by the caller).
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<VendorAssessment>, sqlx::Error> {
        let query = format!(
            "UPDATE vendor_assessments SET status = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VendorAssessment>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Complete an assessment: status, score, recommendations, completion time.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        overall_score: f64,
        recommendations: &[String],
    ) -> Result<Option<VendorAssessment>, sqlx::Error> {
        let query = format!(
            "UPDATE vendor_assessments SET
                status = 'completed',
                overall_score = $2,
                recommendations = $3,
                completed_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VendorAssessment>(&query)
            .bind(id)
            .bind(overall_score)
            .bind(recommendations)
            .fetch_optional(pool)
            .await
    }

    /// The most recent completed (or approved) overall score for a vendor.
    pub async fn latest_completed_score(
        pool: &PgPool,
        vendor_id: DbId,
    ) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT overall_score FROM vendor_assessments
             WHERE vendor_id = $1
               AND status IN ('completed', 'approved')
               AND overall_score IS NOT NULL
             ORDER BY completed_at DESC
             LIMIT 1",
        )
        .bind(vendor_id)
        .fetch_optional(pool)
        .await
    }

    /// Find an open (non-terminal) triggered reassessment for a vendor.
    ///
    /// Used to suppress duplicate reassessments when qualifying signals
    /// arrive in quick succession.
    pub async fn find_open_triggered(
        pool: &PgPool,
        vendor_id: DbId,
    ) -> Result<Option<VendorAssessment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vendor_assessments
             WHERE vendor_id = $1
               AND assessment_type = 'triggered_reassessment'
               AND status NOT IN ('approved', 'rejected', 'expired')
             ORDER BY created_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, VendorAssessment>(&query)
            .bind(vendor_id)
            .fetch_optional(pool)
            .await
    }
}
