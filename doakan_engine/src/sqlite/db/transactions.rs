use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewTransaction, Transaction, TransactionId, TransactionStatus},
    traits::TransactionStoreError,
};

/// Inserts a new transaction with status `pending`. A duplicate id is reported as `TransactionAlreadyExists`.
///
/// `RETURNING` statements are always read with `fetch_all`. Stopping after the first row leaves the statement, and its
/// implicit write transaction, open on the pooled connection, so other connections would not see the row.
pub async fn insert_transaction(
    tx: NewTransaction,
    conn: &mut SqliteConnection,
) -> Result<Transaction, TransactionStoreError> {
    let id = tx.id.clone();
    let result = sqlx::query_as::<_, Transaction>(
        r#"
            INSERT INTO transactions (
                id,
                donation_id,
                user_id,
                amount,
                status,
                va_number,
                bank,
                payment_url
            ) VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(tx.id)
    .bind(tx.donation_id)
    .bind(tx.user_id)
    .bind(tx.amount)
    .bind(tx.va_number)
    .bind(tx.bank)
    .bind(tx.payment_url)
    .fetch_all(conn)
    .await
    .and_then(|mut rows| rows.pop().ok_or(sqlx::Error::RowNotFound));
    match result {
        Ok(transaction) => {
            debug!("🗃️ Transaction [{id}] inserted");
            Ok(transaction)
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(TransactionStoreError::TransactionAlreadyExists(id))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_transaction(
    id: &TransactionId,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transactions WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await
}

pub async fn fetch_transactions_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Transaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transactions WHERE user_id = $1 ORDER BY created_at DESC, rowid DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await
}

pub async fn fetch_transactions_for_donation(
    donation_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Transaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transactions WHERE donation_id = $1 ORDER BY created_at DESC, rowid DESC")
        .bind(donation_id)
        .fetch_all(conn)
        .await
}

/// Sets the status only if the transaction is still `pending`. Returns `None` when no row matched, either because the
/// transaction does not exist or because it has already left `pending`.
///
/// The guard lives in the `WHERE` clause, so two concurrent calls cannot both succeed.
pub async fn update_status_if_pending(
    id: &TransactionId,
    status: TransactionStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    let mut rows: Vec<Transaction> = sqlx::query_as(
        r#"
            UPDATE transactions SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND status = 'pending'
            RETURNING *;
        "#,
    )
    .bind(status)
    .bind(id.as_str())
    .fetch_all(conn)
    .await?;
    let updated = rows.pop();
    trace!("🗃️ Conditional update of [{id}] to {status}: {}", if updated.is_some() { "applied" } else { "no match" });
    Ok(updated)
}
