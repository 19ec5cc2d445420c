pub mod transformers;


use std::{sync::Arc, time::Duration};

use common_enums::{OrderStatus, RefundStatus};
use common_utils::{
    crypto,
    date_time,
    errors::{CustomResult, ReportSwitchExt},
    ext_traits::{ByteSliceExt, Encode},
    request::{Method, RequestBuilder, RequestContent},
};
use domain_types::{
    errors::{ConnectorError, ValidationField},
    order::{Order, PaymentMethodParams},
    refund::Refund,
    router_response_types::Response,
    types::{ConnectorParams, Proxy},
};
use error_stack::{report, ResultExt};
use external_services::service::{call_connector_api, create_client};
use hyperswitch_masking::{Mask, Maskable, PeekInterface, Secret};
use interfaces::{
    connector_types::{PaymentGateway, Requisites},
    verification::SourceVerification,
};
use serde::Serialize;
use transformers::{
    self as cardpay, CallbackExpectation, CardpayOrderRequest, CardpayPaymentCallback,
    CardpayPlanRequest, CardpayPlanResponse, CardpayRedirectResponse, CardpayRefundCallback,
    CardpayRefundRequest, CardpayRefundResponse, CardpayRouterData,
    CardpaySubscriptionStatusRequest,
};

use crate::access_token::{
    create_auth_header, refresh_form_fields, AccessTokenResponseData, CredentialCache,
    TerminalAuth, TokenEndpoint,
};

pub(crate) mod headers {
    pub(crate) const AUTHORIZATION: &str = "Authorization";
}

const CONNECTOR_NAME: &str = "cardpay";
const TOKEN_PATH: &str = "/api/auth/token";
const PLANS_PATH: &str = "/api/recurring_plans";

pub struct Cardpay {
    base_url: String,
    client: reqwest::Client,
    credentials: Arc<CredentialCache>,
}

impl Cardpay {
    pub fn new(
        params: &ConnectorParams,
        proxy: &Proxy,
        credentials: Arc<CredentialCache>,
    ) -> CustomResult<Self, ConnectorError> {
        let client = create_client(
            proxy,
            proxy.should_bypass(&params.base_url),
            Duration::from_secs(params.timeout_secs),
        )
        .switch()?;
        Ok(Self {
            base_url: params.base_url.trim_end_matches('/').to_string(),
            client,
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn authorize(
        &self,
        params: &PaymentMethodParams,
    ) -> CustomResult<Secret<String>, ConnectorError> {
        let auth = TerminalAuth::try_from(params)?;
        let credential = self.credentials.ensure_credential(&auth, self).await?;
        Ok(create_auth_header(&credential))
    }

    async fn send(
        &self,
        flow: &str,
        method: Method,
        path: &str,
        authorization: Option<Secret<String>>,
        body: Option<RequestContent>,
    ) -> CustomResult<Response, ConnectorError> {
        let mut builder = RequestBuilder::new()
            .method(method)
            .url(&self.url(path))
            .attach_default_headers();
        if let Some(authorization) = authorization {
            builder = builder.headers(vec![(
                headers::AUTHORIZATION.to_string(),
                authorization.into_masked(),
            )]);
        }
        if let Some(body) = body {
            builder = builder.set_body(body);
        }
        let (_latency, response) =
            call_connector_api(&self.client, builder.build(), CONNECTOR_NAME, flow)
                .await
                .switch()?;
        Ok(response)
    }

    async fn send_json<T: Serialize>(
        &self,
        flow: &str,
        method: Method,
        path: &str,
        authorization: Secret<String>,
        payload: &T,
    ) -> CustomResult<Response, ConnectorError> {
        let body = payload
            .encode_to_value()
            .change_context(ConnectorError::RequestEncodingFailed)?;
        self.send(
            flow,
            method,
            path,
            Some(authorization),
            Some(RequestContent::Json(body)),
        )
        .await
    }

    async fn token_grant(
        &self,
        flow: &str,
        form: Vec<(String, Maskable<String>)>,
    ) -> CustomResult<AccessTokenResponseData, ConnectorError> {
        let response = self
            .send(
                flow,
                Method::Post,
                TOKEN_PATH,
                None,
                Some(RequestContent::FormUrlEncoded(form)),
            )
            .await
            .change_context(ConnectorError::AuthenticationFailed)?;
        if response.status_code != 200 {
            return Err(report!(ConnectorError::AuthenticationFailed)).attach_printable_lazy(
                || format!("token endpoint answered {}", response.status_code),
            );
        }
        response
            .response
            .parse_struct::<AccessTokenResponseData>("AccessTokenResponseData")
            .change_context(ConnectorError::AuthenticationFailed)
    }

    /// Creates the recurring plan an order's subscription is charged against.
    pub async fn create_recurring_plan(
        &self,
        order: &Order,
    ) -> CustomResult<String, ConnectorError> {
        let request = CardpayPlanRequest::try_from(order)?;
        let authorization = self.authorize(&order.payment_method.params).await?;
        let response = self
            .send_json(
                "create_recurring_plan",
                Method::Post,
                PLANS_PATH,
                authorization,
                &request,
            )
            .await?;
        if !response.is_success() {
            return Err(report!(ConnectorError::UnexpectedHttpStatus {
                status_code: response.status_code
            }));
        }
        let plan = response
            .response
            .parse_struct::<CardpayPlanResponse>("CardpayPlanResponse")
            .change_context(ConnectorError::MalformedResponseBody)?
            .plan_data;
        if !plan.is_active() {
            return Err(report!(ConnectorError::PlanInactive))
                .attach_printable_lazy(|| format!("plan {} is {}", plan.id, plan.status));
        }
        Ok(plan.id)
    }

    /// Posts an order and reads the redirect URL out of a 200 answer.
    async fn post_order(
        &self,
        flow: &str,
        order: &Order,
        request: &CardpayOrderRequest,
    ) -> CustomResult<String, ConnectorError> {
        let authorization = self.authorize(&order.payment_method.params).await?;
        let response = self
            .send_json(flow, Method::Post, request.endpoint(), authorization, request)
            .await?;
        if response.status_code != 200 {
            return Err(report!(ConnectorError::UnexpectedHttpStatus {
                status_code: response.status_code
            }));
        }
        response
            .response
            .parse_struct::<CardpayRedirectResponse>("CardpayRedirectResponse")
            .change_context(ConnectorError::MalformedResponseBody)?
            .redirect_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| report!(ConnectorError::MalformedResponseBody))
            .attach_printable("redirect_url is missing")
    }

    fn verify_callback(
        &self,
        secret: &Secret<String>,
        raw_body: &[u8],
        signature: &str,
    ) -> CustomResult<(), ConnectorError> {
        if secret.peek().is_empty() || !self.verify(secret, signature, raw_body)? {
            return Err(report!(ConnectorError::SignatureInvalid));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl TokenEndpoint for Cardpay {
    async fn password_grant(
        &self,
        auth: &TerminalAuth,
    ) -> CustomResult<AccessTokenResponseData, ConnectorError> {
        self.token_grant("password_grant", auth.clone().form_fields())
            .await
    }

    async fn refresh_grant(
        &self,
        terminal_code: &str,
        refresh_token: &Secret<String>,
    ) -> CustomResult<AccessTokenResponseData, ConnectorError> {
        self.token_grant(
            "refresh_grant",
            refresh_form_fields(terminal_code, refresh_token),
        )
        .await
    }
}

impl SourceVerification for Cardpay {
    fn get_algorithm(
        &self,
    ) -> CustomResult<Box<dyn crypto::VerifySignature + Send>, ConnectorError> {
        Ok(Box::new(crypto::Sha512))
    }
}

#[async_trait::async_trait]
impl PaymentGateway for Cardpay {
    async fn create_payment(
        &self,
        order: &mut Order,
        success_url: &str,
        fail_url: &str,
        requisites: &Requisites,
    ) -> CustomResult<String, ConnectorError> {
        let request = CardpayOrderRequest::try_from(CardpayRouterData {
            order,
            success_url,
            fail_url,
            requisites,
        })?;

        order.private_status = OrderStatus::RejectedOnCreate;
        let redirect_url = self.post_order("create_payment", order, &request).await?;
        order.private_status = OrderStatus::Created;
        order.updated_at = date_time::now();
        Ok(redirect_url)
    }

    fn verify_callback_source(
        &self,
        order: &Order,
        raw_body: &[u8],
        signature: &str,
    ) -> CustomResult<(), ConnectorError> {
        self.verify_callback(&order.payment_method.params.secret_callback, raw_body, signature)
    }

    #[tracing::instrument(skip_all, fields(order_id = %order.id))]
    fn process_payment(
        &self,
        order: &mut Order,
        raw_body: &[u8],
        signature: &str,
    ) -> CustomResult<(), ConnectorError> {
        self.verify_callback(&order.payment_method.params.secret_callback, raw_body, signature)?;

        let callback = raw_body
            .parse_struct::<CardpayPaymentCallback>("CardpayPaymentCallback")
            .change_context(ConnectorError::MalformedResponseBody)?;
        let transaction = callback
            .transaction()
            .ok_or_else(|| report!(ConnectorError::MalformedResponseBody))
            .attach_printable("callback carries neither payment_data nor recurring_data")?;
        let status = cardpay::parse_payment_status(&transaction.status)?;
        let callback_time = cardpay::validate_callback(
            &CallbackExpectation {
                payment_method: &order.payment_method.external_id,
                amount: order.charge_amount,
                currency: order.charge_currency,
            },
            &callback.payment_method,
            transaction,
            &callback.callback_time,
        )?;

        let next_status = cardpay::get_order_status(status)?;
        if next_status == order.private_status {
            tracing::info!(status = %next_status, "callback repeats the current status");
            return Ok(());
        }
        if order.private_status.is_terminal() {
            return Err(report!(ConnectorError::ValidationError {
                field: ValidationField::Status
            }))
            .attach_printable_lazy(|| {
                format!(
                    "order is already {}, callback reports {next_status}",
                    order.private_status
                )
            });
        }

        order.private_status = next_status;
        order.transaction_id = Some(transaction.id.clone());
        if let Some(subscription) = transaction.subscription.as_ref() {
            order.recurring_subscription_id = Some(subscription.id.clone());
        }
        match next_status {
            OrderStatus::PaymentSystemDeclined => {
                order.cancellation = transaction.cancellation();
            }
            OrderStatus::PaymentSystemCanceled => {
                order.cancellation = transaction.cancellation();
                order.canceled_at = Some(callback_time);
            }
            OrderStatus::PaymentSystemComplete => {
                order.refund_allowed = order.payment_method.refund_allowed;
                order.payment_method_order_closed_at = Some(callback_time);
                order.payment_requisites = callback.payment_requisites();
            }
            OrderStatus::New | OrderStatus::Created | OrderStatus::RejectedOnCreate => {}
        }
        order.updated_at = date_time::now();
        tracing::info!(status = %next_status, transaction_id = %transaction.id, "payment callback applied");
        Ok(())
    }

    async fn create_refund(
        &self,
        order: &Order,
        refund: &mut Refund,
    ) -> CustomResult<(), ConnectorError> {
        let request = CardpayRefundRequest::try_from((order, &*refund))?;

        refund.status = RefundStatus::Rejected;
        let authorization = self.authorize(&order.payment_method.params).await?;
        let response = self
            .send_json(
                "create_refund",
                Method::Post,
                "/api/refunds",
                authorization,
                &request,
            )
            .await?;
        if response.status_code != 201 {
            return Err(report!(ConnectorError::UnexpectedHttpStatus {
                status_code: response.status_code
            }));
        }
        let refund_data = response
            .response
            .parse_struct::<CardpayRefundResponse>("CardpayRefundResponse")
            .change_context(ConnectorError::MalformedResponseBody)?
            .refund_data;
        let accepted = refund_data
            .status
            .parse::<cardpay::CardpayRefundStatus>()
            .map(|status| status.is_accepted())
            .unwrap_or(false);
        if !accepted {
            return Err(report!(ConnectorError::RequestStatusInvalid))
                .attach_printable_lazy(|| format!("refund answered with {}", refund_data.status));
        }

        refund.status = RefundStatus::InProgress;
        refund.external_id = Some(refund_data.id);
        refund.updated_at = date_time::now();
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(refund_id = %refund.id))]
    fn process_refund(
        &self,
        order: &Order,
        refund: &mut Refund,
        raw_body: &[u8],
        signature: &str,
    ) -> CustomResult<(), ConnectorError> {
        self.verify_callback(&order.payment_method.params.secret_callback, raw_body, signature)?;

        let callback = raw_body
            .parse_struct::<CardpayRefundCallback>("CardpayRefundCallback")
            .change_context(ConnectorError::MalformedResponseBody)?;
        let transaction = &callback.refund_data;
        let status = cardpay::parse_refund_status(&transaction.status)?;
        cardpay::validate_callback(
            &CallbackExpectation {
                payment_method: &order.payment_method.external_id,
                amount: refund.amount,
                currency: refund.currency,
            },
            &callback.payment_method,
            transaction,
            &callback.callback_time,
        )?;

        let next_status = cardpay::get_refund_status(status)?;
        if next_status == refund.status {
            return Ok(());
        }
        if refund.status.is_terminal() {
            return Err(report!(ConnectorError::ValidationError {
                field: ValidationField::Status
            }));
        }

        refund.status = next_status;
        if refund.external_id.is_none() {
            refund.external_id = Some(transaction.id.clone());
        }
        refund.updated_at = date_time::now();
        tracing::info!(status = %next_status, "refund callback applied");
        Ok(())
    }

    async fn create_recurring_subscription(
        &self,
        order: &mut Order,
        success_url: &str,
        fail_url: &str,
        requisites: &Requisites,
    ) -> CustomResult<(String, String), ConnectorError> {
        let mut request = CardpayOrderRequest::try_from(CardpayRouterData {
            order,
            success_url,
            fail_url,
            requisites,
        })?;

        order.private_status = OrderStatus::RejectedOnCreate;
        let plan_id = self.create_recurring_plan(order).await?;
        request.attach_plan(plan_id.clone())?;
        let redirect_url = self
            .post_order("create_recurring_subscription", order, &request)
            .await?;
        order.private_status = OrderStatus::Created;
        order.updated_at = date_time::now();
        Ok((redirect_url, plan_id))
    }

    async fn delete_recurring_subscription(
        &self,
        order: &Order,
        subscription_id: &str,
    ) -> CustomResult<(), ConnectorError> {
        let request = CardpaySubscriptionStatusRequest::cancel()?;
        let authorization = self.authorize(&order.payment_method.params).await?;
        let response = self
            .send_json(
                "delete_recurring_subscription",
                Method::Patch,
                &format!("/api/subscriptions/{subscription_id}"),
                authorization,
                &request,
            )
            .await?;
        if response.status_code != 200 {
            tracing::warn!(
                subscription_id,
                status_code = response.status_code,
                "subscription cancellation was not accepted"
            );
            return Err(report!(ConnectorError::UnexpectedHttpStatus {
                status_code: response.status_code
            }));
        }
        Ok(())
    }

    fn is_recurring_callback(&self, payload: &[u8]) -> bool {
        payload
            .parse_struct::<CardpayPaymentCallback>("CardpayPaymentCallback")
            .map(|callback| callback.is_recurring())
            .unwrap_or(false)
    }

    fn get_recurring_id(&self, payload: &[u8]) -> Option<String> {
        payload
            .parse_struct::<CardpayPaymentCallback>("CardpayPaymentCallback")
            .ok()?
            .recurring_id()
    }

    fn get_transaction_id(&self, payload: &[u8]) -> Option<String> {
        payload
            .parse_struct::<CardpayPaymentCallback>("CardpayPaymentCallback")
            .ok()?
            .transaction()
            .map(|transaction| transaction.id.clone())
    }
}
