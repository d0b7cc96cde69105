use std::sync::Arc;

use time::OffsetDateTime;
use tonic::{Request, Response, Status};
use tracing::info;

use pinguin_core::{generate_notification_id, Channel, DomainError, NotificationId};
use pinguin_proto::notification_submission_server::NotificationSubmission;
use pinguin_proto::{SendEmailRequest, SendNotificationResponse, SendSmsRequest};
use pinguin_store::{NewAttachment, NewNotification, NotificationStore};
use pinguin_tenant::TenantRegistry;

use crate::auth::{authenticate, resolve_tenant_id};
use crate::error::{domain_error_to_status, store_error_to_status};
use crate::validation::{
    validate_attachments, validate_body, validate_email_recipient, validate_schedule_horizon, validate_sms_recipient,
};

/// The gRPC submission facade. One instance is wrapped in a
/// `NotificationSubmissionServer` and mounted on the `tonic` transport; it
/// holds no state of its own beyond what it needs to authenticate and route
/// requests into the store.
pub struct SubmissionService<S: NotificationStore> {
    store: Arc<S>,
    tenants: Arc<TenantRegistry>,
    auth_token: String,
    max_schedule_horizon_days: u32,
}

impl<S: NotificationStore> SubmissionService<S> {
    pub fn new(
        store: Arc<S>,
        tenants: Arc<TenantRegistry>,
        auth_token: String,
        max_schedule_horizon_days: u32,
    ) -> Self {
        Self {
            store,
            tenants,
            auth_token,
            max_schedule_horizon_days,
        }
    }

    /// Resolve a tenant by id and reject it unless it's active, mapping a
    /// suspended or unknown tenant to the same `permission_denied`/`not_found`
    /// taxonomy the wire contract specifies for tenant resolution failures.
    fn resolve_active_tenant(&self, tenant_id: &pinguin_core::TenantId) -> Result<&pinguin_tenant::Tenant, DomainError> {
        let tenant = self.tenants.get_by_id(tenant_id).map_err(DomainError::from)?;
        if !tenant.is_active() {
            return Err(DomainError::Forbidden(format!("tenant {tenant_id} is not active")));
        }
        Ok(tenant)
    }
}

fn timestamp_to_time(ts: prost_types::Timestamp) -> Result<OffsetDateTime, DomainError> {
    OffsetDateTime::from_unix_timestamp(ts.seconds)
        .map(|dt| dt + time::Duration::nanoseconds(ts.nanos as i64))
        .map_err(|_| DomainError::invalid_input("scheduled_for is out of range"))
}

fn time_to_timestamp(dt: OffsetDateTime) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: dt.unix_timestamp(),
        nanos: dt.nanosecond() as i32,
    }
}

#[tonic::async_trait]
impl<S: NotificationStore + 'static> NotificationSubmission for SubmissionService<S> {
    async fn send_email(
        &self,
        request: Request<SendEmailRequest>,
    ) -> Result<Response<SendNotificationResponse>, Status> {
        authenticate(&request, &self.auth_token).map_err(domain_error_to_status)?;

        let body = request.get_ref().clone();
        let tenant_id = resolve_tenant_id(&request, &body.tenant_id).map_err(domain_error_to_status)?;
        let tenant = self.resolve_active_tenant(&tenant_id).map_err(domain_error_to_status)?;

        validate_email_recipient(&body.recipient).map_err(domain_error_to_status)?;
        validate_body(&body.body).map_err(domain_error_to_status)?;
        validate_attachments(tenant, &body.attachments).map_err(domain_error_to_status)?;

        let scheduled_for = match body.scheduled_for {
            Some(ts) => timestamp_to_time(ts).map_err(domain_error_to_status)?,
            None => pinguin_core::now_utc(),
        };
        validate_schedule_horizon(scheduled_for, pinguin_core::now_utc(), self.max_schedule_horizon_days)
            .map_err(domain_error_to_status)?;

        let notification_id = if body.notification_id.is_empty() {
            generate_notification_id()
        } else {
            NotificationId::new(body.notification_id.clone())
        };

        let attachments = body
            .attachments
            .into_iter()
            .map(|a| NewAttachment {
                filename: a.filename,
                content_type: a.content_type,
                payload_bytes: a.payload_bytes,
            })
            .collect();

        let new = NewNotification {
            notification_id: notification_id.clone(),
            tenant_id: tenant_id.clone(),
            channel: Channel::Email,
            recipient: body.recipient,
            subject: Some(body.subject).filter(|s| !s.is_empty()),
            body: body.body,
            scheduled_for,
            max_retries: tenant.retry_policy.max_retries,
            attachments,
        };

        let created = self
            .store
            .create(&tenant_id, new)
            .await
            .map_err(store_error_to_status)?;

        info!(%tenant_id, notification_id = %created.notification_id, channel = "email", "notification accepted");

        Ok(Response::new(SendNotificationResponse {
            notification_id: created.notification_id.to_string(),
            scheduled_for: Some(time_to_timestamp(created.scheduled_for)),
        }))
    }

    async fn send_sms(
        &self,
        request: Request<SendSmsRequest>,
    ) -> Result<Response<SendNotificationResponse>, Status> {
        authenticate(&request, &self.auth_token).map_err(domain_error_to_status)?;

        let body = request.get_ref().clone();
        let tenant_id = resolve_tenant_id(&request, &body.tenant_id).map_err(domain_error_to_status)?;
        let tenant = self.resolve_active_tenant(&tenant_id).map_err(domain_error_to_status)?;

        validate_sms_recipient(&body.recipient).map_err(domain_error_to_status)?;
        validate_body(&body.text).map_err(domain_error_to_status)?;

        let scheduled_for = match body.scheduled_for {
            Some(ts) => timestamp_to_time(ts).map_err(domain_error_to_status)?,
            None => pinguin_core::now_utc(),
        };
        validate_schedule_horizon(scheduled_for, pinguin_core::now_utc(), self.max_schedule_horizon_days)
            .map_err(domain_error_to_status)?;

        let notification_id = if body.notification_id.is_empty() {
            generate_notification_id()
        } else {
            NotificationId::new(body.notification_id.clone())
        };

        let new = NewNotification {
            notification_id: notification_id.clone(),
            tenant_id: tenant_id.clone(),
            channel: Channel::Sms,
            recipient: body.recipient,
            subject: None,
            body: body.text,
            scheduled_for,
            max_retries: tenant.retry_policy.max_retries,
            attachments: vec![],
        };

        let created = self
            .store
            .create(&tenant_id, new)
            .await
            .map_err(store_error_to_status)?;

        info!(%tenant_id, notification_id = %created.notification_id, channel = "sms", "notification accepted");

        Ok(Response::new(SendNotificationResponse {
            notification_id: created.notification_id.to_string(),
            scheduled_for: Some(time_to_timestamp(created.scheduled_for)),
        }))
    }
}

impl<S: NotificationStore> std::fmt::Debug for SubmissionService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionService").finish_non_exhaustive()
    }
}
