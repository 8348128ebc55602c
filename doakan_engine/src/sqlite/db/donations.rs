use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{Donation, NewDonation, Rupiah};

pub async fn insert_donation(donation: NewDonation, conn: &mut SqliteConnection) -> Result<Donation, sqlx::Error> {
    let donation: Donation = sqlx::query_as::<_, Donation>(
        r#"
            INSERT INTO donations (user_id, title, target_amount, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(donation.user_id)
    .bind(donation.title)
    .bind(donation.target_amount)
    .bind(donation.is_active)
    .fetch_all(conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    debug!("🗃️ Donation #{} created for user #{}", donation.id, donation.user_id);
    Ok(donation)
}

pub async fn fetch_donation_by_id(donation_id: i64, conn: &mut SqliteConnection) -> Result<Option<Donation>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM donations WHERE id = $1").bind(donation_id).fetch_optional(conn).await
}

pub async fn set_donation_active(
    donation_id: i64,
    is_active: bool,
    conn: &mut SqliteConnection,
) -> Result<Option<Donation>, sqlx::Error> {
    let mut rows: Vec<Donation> =
        sqlx::query_as("UPDATE donations SET is_active = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(is_active)
            .bind(donation_id)
            .fetch_all(conn)
            .await?;
    Ok(rows.pop())
}

/// Adds a settled amount to the campaign's totals with an in-place increment. Never read-modify-write these columns.
/// Returns `false` if the campaign does not exist.
pub async fn add_settled_amount(
    donation_id: i64,
    amount: Rupiah,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE donations SET
                collected_amount = collected_amount + $1,
                donor_count = donor_count + 1,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
        "#,
    )
    .bind(amount)
    .bind(donation_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}
