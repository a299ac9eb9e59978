//! HTTP implementation of [`BookingBackend`].

use super::envelope::{self, Unwrapped};
use super::template;
use super::{
    ApiFailure, ApiResponse, ApiSuccess, BackendFuture, BookingBackend, BookingConfirmation,
    PaymentVerification, RequestContext,
};
use crate::adapter::{AdapterHandle, Endpoint};
use crate::config::WidgetConfig;
use crate::error::{ApiError, BookingError};
use crate::types::{BookingData, Category, Filters, Item, ItemId};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Generic HTTP client driven by the active adapter
///
/// The adapter supplies URL templates, field names, validation, and the
/// booking payload; this service only performs requests and normalizes
/// responses.
#[derive(Clone, Debug)]
pub struct UniversalApiService {
    client: Client,
}

type ApiResult<T> = Result<ApiSuccess<T>, ApiError>;

impl UniversalApiService {
    /// Create a service whose client defaults to the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::HttpClient`] if the TLS backend cannot be
    /// initialized.
    pub fn new(config: &WidgetConfig) -> Result<Self, BookingError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("universal-booking/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BookingError::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }

    /// Create a service around an existing client
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn base_url(ctx: &RequestContext) -> &str {
        ctx.adapter
            .api_config()
            .base_url
            .as_deref()
            .unwrap_or(&ctx.config.api_base_url)
    }

    /// Resolve an endpoint to a full URL, or `None` if the adapter lacks it
    fn endpoint_url(
        ctx: &RequestContext,
        endpoint: Endpoint,
        params: &[(&str, &str)],
    ) -> Option<Result<String, ApiError>> {
        let path = ctx.adapter.api_config().url(endpoint)?;
        Some(
            template::resolve(path, params, &ctx.config)
                .map(|path| template::join(Self::base_url(ctx), &path)),
        )
    }

    fn required_url(
        ctx: &RequestContext,
        endpoint: Endpoint,
        params: &[(&str, &str)],
    ) -> Result<String, ApiError> {
        Self::endpoint_url(ctx, endpoint, params)
            .unwrap_or(Err(ApiError::MissingEndpoint(endpoint.as_str())))
    }

    async fn execute(
        client: &Client,
        ctx: &RequestContext,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Unwrapped, ApiError> {
        tracing::debug!(%method, url, "Sending backend request");

        let mut request = client
            .request(method, url)
            .timeout(ctx.config.request_timeout())
            .header(ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let decoded = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => value,
                Err(_) if !status.is_success() => Value::String(text),
                Err(e) => return Err(ApiError::Decode(e.to_string())),
            }
        };

        if !status.is_success() {
            let message = match &decoded {
                Value::Object(object) => envelope::message_of(object),
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            }
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
                body: Some(decoded).filter(|v| !v.is_null()),
            });
        }

        envelope::unwrap(decoded, status.as_u16())
    }

    fn decode_record<T: DeserializeOwned>(mut record: Value, adapter: &AdapterHandle) -> Result<T, ApiError> {
        envelope::normalize(&mut record, &adapter.api_config().data_fields);
        serde_json::from_value(record).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn decode_list<T: DeserializeOwned>(payload: Value, adapter: &AdapterHandle) -> Result<Vec<T>, ApiError> {
        envelope::into_list(payload)?
            .into_iter()
            .map(|record| Self::decode_record(record, adapter))
            .collect()
    }

    #[tracing::instrument(name = "get_available_items", skip_all, fields(business_type = ctx.adapter.business_type()))]
    async fn fetch_items(client: Client, ctx: RequestContext, filters: Filters) -> ApiResult<Vec<Item>> {
        let url = Self::required_url(&ctx, Endpoint::List, &[])?;
        let (payload, meta) = Self::execute(&client, &ctx, Method::GET, &url, &filters.pairs(), None).await?;
        let data = Self::decode_list(payload, &ctx.adapter)?;
        Ok(ApiSuccess { data, meta })
    }

    #[tracing::instrument(name = "get_item_details", skip_all, fields(business_type = ctx.adapter.business_type(), %id))]
    async fn fetch_item(client: Client, ctx: RequestContext, id: ItemId) -> ApiResult<Item> {
        let url = Self::required_url(&ctx, Endpoint::Details, &[("id", id.as_str())])?;
        let (payload, meta) = Self::execute(&client, &ctx, Method::GET, &url, &[], None).await?;
        let data = Self::decode_record(payload, &ctx.adapter)?;
        Ok(ApiSuccess { data, meta })
    }

    #[tracing::instrument(name = "get_sub_items", skip_all, fields(business_type = ctx.adapter.business_type(), %id))]
    async fn fetch_sub_items(client: Client, ctx: RequestContext, id: ItemId) -> ApiResult<Vec<Item>> {
        let Some(url) = Self::endpoint_url(&ctx, Endpoint::SubItems, &[("id", id.as_str())]) else {
            tracing::debug!("No sub-item endpoint; returning an empty list");
            return Ok(ApiSuccess::new(Vec::new()));
        };
        let (payload, meta) = Self::execute(&client, &ctx, Method::GET, &url?, &[], None).await?;
        let data = Self::decode_list(payload, &ctx.adapter)?;
        Ok(ApiSuccess { data, meta })
    }

    #[tracing::instrument(name = "get_categories", skip_all, fields(business_type = ctx.adapter.business_type()))]
    async fn fetch_categories(client: Client, ctx: RequestContext) -> ApiResult<Vec<Category>> {
        let Some(url) = Self::endpoint_url(&ctx, Endpoint::Categories, &[]) else {
            tracing::debug!("No category endpoint; returning an empty list");
            return Ok(ApiSuccess::new(Vec::new()));
        };
        let (payload, meta) = Self::execute(&client, &ctx, Method::GET, &url?, &[], None).await?;
        let data = Self::decode_list(payload, &ctx.adapter)?;
        Ok(ApiSuccess { data, meta })
    }

    #[tracing::instrument(name = "create_booking", skip_all, fields(business_type = ctx.adapter.business_type()))]
    async fn submit_booking(client: Client, ctx: RequestContext, data: BookingData) -> ApiResult<BookingConfirmation> {
        let report = ctx.adapter.validate_booking_data(&data);
        if !report.is_valid {
            return Err(ApiError::Validation(report.errors));
        }

        let payload = ctx.adapter.transform_booking_data(&data);
        let item_id = data.selected_item.as_ref().map(|item| item.id.to_string());
        let params: Vec<(&str, &str)> = item_id.iter().map(|id| ("id", id.as_str())).collect();

        let url = Self::required_url(&ctx, Endpoint::CreateBooking, &params)?;
        let (response, meta) = Self::execute(&client, &ctx, Method::POST, &url, &[], Some(&payload)).await?;

        let confirmation = BookingConfirmation {
            reference: ctx.adapter.booking_reference(&response),
            payment_redirect: ctx.adapter.payment_redirect_url(&response),
            data: response,
        };
        tracing::info!(reference = ?confirmation.reference, "Booking created");

        Ok(ApiSuccess { data: confirmation, meta })
    }

    #[tracing::instrument(name = "update_booking", skip_all, fields(business_type = ctx.adapter.business_type(), %id))]
    async fn send_update(client: Client, ctx: RequestContext, id: String, patch: Value) -> ApiResult<Value> {
        let url = Self::required_url(&ctx, Endpoint::UpdateBooking, &[("id", id.as_str())])?;
        let (data, meta) = Self::execute(&client, &ctx, Method::PUT, &url, &[], Some(&patch)).await?;
        Ok(ApiSuccess { data, meta })
    }

    #[tracing::instrument(name = "cancel_booking", skip_all, fields(business_type = ctx.adapter.business_type(), %id))]
    async fn send_cancel(client: Client, ctx: RequestContext, id: String) -> ApiResult<Value> {
        let url = Self::required_url(&ctx, Endpoint::CancelBooking, &[("id", id.as_str())])?;
        let (data, meta) = Self::execute(&client, &ctx, Method::POST, &url, &[], None).await?;
        Ok(ApiSuccess { data, meta })
    }

    #[tracing::instrument(name = "verify_payment", skip_all, fields(%reference))]
    async fn send_verification(client: Client, ctx: RequestContext, reference: String) -> ApiResult<PaymentVerification> {
        let url = template::join(&ctx.config.api_base_url, "/payment/verify");
        let query = [("reference".to_string(), reference)];
        let (payload, meta) = Self::execute(&client, &ctx, Method::POST, &url, &query, None).await?;
        let data = serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(ApiSuccess { data, meta })
    }
}

/// Log a failed operation and normalize its error
fn settle<T>(operation: &'static str, result: ApiResult<T>) -> ApiResponse<T> {
    result.map_err(|error| {
        tracing::warn!(operation, %error, "Backend operation failed");
        ApiFailure::from(error)
    })
}

impl BookingBackend for UniversalApiService {
    fn get_available_items(&self, ctx: &RequestContext, filters: Filters) -> BackendFuture<Vec<Item>> {
        let (client, ctx) = (self.client.clone(), ctx.clone());
        Box::pin(async move { settle("get_available_items", Self::fetch_items(client, ctx, filters).await) })
    }

    fn get_item_details(&self, ctx: &RequestContext, id: ItemId) -> BackendFuture<Item> {
        let (client, ctx) = (self.client.clone(), ctx.clone());
        Box::pin(async move { settle("get_item_details", Self::fetch_item(client, ctx, id).await) })
    }

    fn get_sub_items(&self, ctx: &RequestContext, id: ItemId) -> BackendFuture<Vec<Item>> {
        let (client, ctx) = (self.client.clone(), ctx.clone());
        Box::pin(async move { settle("get_sub_items", Self::fetch_sub_items(client, ctx, id).await) })
    }

    fn get_categories(&self, ctx: &RequestContext) -> BackendFuture<Vec<Category>> {
        let (client, ctx) = (self.client.clone(), ctx.clone());
        Box::pin(async move { settle("get_categories", Self::fetch_categories(client, ctx).await) })
    }

    fn create_booking(&self, ctx: &RequestContext, data: BookingData) -> BackendFuture<BookingConfirmation> {
        let (client, ctx) = (self.client.clone(), ctx.clone());
        Box::pin(async move { settle("create_booking", Self::submit_booking(client, ctx, data).await) })
    }

    fn update_booking(&self, ctx: &RequestContext, id: String, patch: Value) -> BackendFuture<Value> {
        let (client, ctx) = (self.client.clone(), ctx.clone());
        Box::pin(async move { settle("update_booking", Self::send_update(client, ctx, id, patch).await) })
    }

    fn cancel_booking(&self, ctx: &RequestContext, id: String) -> BackendFuture<Value> {
        let (client, ctx) = (self.client.clone(), ctx.clone());
        Box::pin(async move { settle("cancel_booking", Self::send_cancel(client, ctx, id).await) })
    }

    fn verify_payment(&self, ctx: &RequestContext, reference: String) -> BackendFuture<PaymentVerification> {
        let (client, ctx) = (self.client.clone(), ctx.clone());
        Box::pin(async move { settle("verify_payment", Self::send_verification(client, ctx, reference).await) })
    }
}
