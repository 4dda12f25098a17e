//! Audit trail for account, billing and payment events.
//!
//! Rows are written through the sqlx pool outside any ORM transaction, so a
//! rolled-back flow still leaves a trace. Failures are logged and swallowed;
//! an unavailable audit table must never fail the request that triggered it.

use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::db::DbPool;

pub async fn log_audit(
    pool: &DbPool,
    user_id: Option<Uuid>,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) {
    let id = Uuid::new_v4();
    let result = sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await;

    if let Err(err) = result {
        warn!(error = %err, action, "audit log failed");
    }
}
