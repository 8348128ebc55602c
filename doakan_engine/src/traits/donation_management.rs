use crate::{db_types::Donation, traits::TransactionStoreError};

#[allow(async_fn_in_trait)]
pub trait DonationManagement {
    /// Fetches the campaign with the given id, or `None` if it does not exist.
    async fn fetch_donation(&self, donation_id: i64) -> Result<Option<Donation>, TransactionStoreError>;
}
