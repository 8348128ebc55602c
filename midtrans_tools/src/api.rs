use std::sync::Arc;

use doakan_common::Rupiah;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    StatusCode,
};

use crate::{
    config::MidtransConfig,
    data_objects::{ChargeRequest, ChargeResponse},
    MidtransApiError,
};

#[derive(Clone)]
pub struct MidtransApi {
    config: MidtransConfig,
    client: Arc<Client>,
}

impl MidtransApi {
    pub fn new(config: MidtransConfig) -> Result<Self, MidtransApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| MidtransApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &MidtransConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    /// Sends a charge request to `/v2/charge`.
    ///
    /// Both the HTTP status and the `status_code` in the body are checked, since Midtrans frequently returns HTTP 200
    /// for failed charges.
    pub async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResponse, MidtransApiError> {
        let url = self.url("/v2/charge");
        let order_id = request.transaction_details.order_id.as_str();
        trace!("💳️ Sending charge request for {order_id} to {url}");
        let response = self
            .client
            .post(url)
            .basic_auth(self.config.server_key.reveal(), Some(""))
            .json(request)
            .send()
            .await
            .map_err(|e| MidtransApiError::Transport { timed_out: e.is_timeout(), message: e.to_string() })?;
        let status = response.status();
        if status.is_server_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(MidtransApiError::ServerError { status: status.as_u16(), message });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MidtransApiError::Rejected { status: status.as_u16(), message });
        }
        let body = response.json::<ChargeResponse>().await.map_err(|e| MidtransApiError::JsonError(e.to_string()))?;
        let message = body.status_message.clone().unwrap_or_default();
        match body.status_code().map(StatusCode::from_u16) {
            Some(Ok(code)) if code.is_server_error() => {
                Err(MidtransApiError::ServerError { status: code.as_u16(), message })
            },
            Some(Ok(code)) if code.is_success() => {
                debug!("💳️ Charge for {order_id} created. {message}");
                Ok(body)
            },
            Some(Ok(code)) => Err(MidtransApiError::Rejected { status: code.as_u16(), message }),
            _ => Err(MidtransApiError::JsonError(format!("Unrecognised status_code '{}'", body.status_code))),
        }
    }

    /// Creates a virtual-account charge at the configured bank and checks that a VA number was issued.
    pub async fn bank_transfer_charge(&self, order_id: &str, amount: Rupiah) -> Result<ChargeResponse, MidtransApiError> {
        let request = ChargeRequest::bank_transfer(order_id, amount.value(), self.config.bank.as_str());
        let response = self.charge(&request).await?;
        if response.virtual_account().is_none() {
            warn!("💳️ Charge for {order_id} succeeded but no virtual account was returned");
            return Err(MidtransApiError::MissingVirtualAccount(order_id.to_string()));
        }
        Ok(response)
    }
}
