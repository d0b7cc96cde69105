use time::OffsetDateTime;

use pinguin_core::DomainError;
use pinguin_proto::EmailAttachment;
use pinguin_tenant::Tenant;

/// Attachments beyond this count are rejected regardless of their combined
/// byte size — guards against a request with thousands of tiny attachments.
const MAX_ATTACHMENT_COUNT: usize = 10;

fn validate_recipient(recipient: &str) -> Result<(), DomainError> {
    if recipient.trim().is_empty() {
        return Err(DomainError::invalid_input("recipient is required"));
    }
    Ok(())
}

/// Not a full RFC 5322 validator — rejects obviously malformed addresses
/// (missing `@`, empty local/domain parts, no `.` in the domain) before a
/// submission reaches the store.
pub fn validate_email_recipient(recipient: &str) -> Result<(), DomainError> {
    validate_recipient(recipient)?;
    let mut parts = recipient.splitn(2, '@');
    match (parts.next(), parts.next()) {
        (Some(local), Some(domain))
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') =>
        {
            Ok(())
        }
        _ => Err(DomainError::invalid_input("recipient is not a valid email address")),
    }
}

/// E.164-shaped recipient: a leading `+` followed by 8-15 digits.
pub fn validate_sms_recipient(recipient: &str) -> Result<(), DomainError> {
    validate_recipient(recipient)?;
    let digits = recipient
        .strip_prefix('+')
        .ok_or_else(|| DomainError::invalid_input("recipient must be in E.164 format (leading +)"))?;
    if digits.len() < 8 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::invalid_input(
            "recipient must be in E.164 format (+ followed by 8-15 digits)",
        ));
    }
    Ok(())
}

pub fn validate_body(body: &str) -> Result<(), DomainError> {
    if body.is_empty() {
        return Err(DomainError::invalid_input("body is required"));
    }
    Ok(())
}

/// Reject attachment sets that exceed the tenant's configured byte ceiling
/// (summed across every attachment) or the fixed count cap.
pub fn validate_attachments(tenant: &Tenant, attachments: &[EmailAttachment]) -> Result<(), DomainError> {
    if attachments.len() > MAX_ATTACHMENT_COUNT {
        return Err(DomainError::invalid_input(format!(
            "at most {MAX_ATTACHMENT_COUNT} attachments are allowed per request, got {}",
            attachments.len()
        )));
    }

    let total: u64 = attachments.iter().map(|a| a.payload_bytes.len() as u64).sum();
    if total > tenant.max_attachment_bytes {
        return Err(DomainError::invalid_input(format!(
            "attachments total {total} bytes, exceeding the {} byte limit for this tenant",
            tenant.max_attachment_bytes
        )));
    }
    for attachment in attachments {
        if attachment.filename.trim().is_empty() {
            return Err(DomainError::invalid_input("attachment filename is required"));
        }
    }
    Ok(())
}

/// Reject a `scheduled_for` more than `max_days` past `now` — keeps a
/// mistakenly huge timestamp from parking a row in the queue indefinitely.
pub fn validate_schedule_horizon(
    scheduled_for: OffsetDateTime,
    now: OffsetDateTime,
    max_days: u32,
) -> Result<(), DomainError> {
    let horizon = now + time::Duration::days(max_days as i64);
    if scheduled_for > horizon {
        return Err(DomainError::invalid_input(format!(
            "scheduled_for is more than {max_days} days in the future"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_recipient_is_invalid() {
        assert!(validate_email_recipient("  ").is_err());
        assert!(validate_sms_recipient("  ").is_err());
    }

    #[test]
    fn empty_body_is_invalid() {
        assert!(validate_body("").is_err());
    }

    #[test]
    fn malformed_email_recipient_is_invalid() {
        assert!(validate_email_recipient("not-an-email").is_err());
        assert!(validate_email_recipient("a@b").is_err());
        assert!(validate_email_recipient("a@b.com").is_ok());
    }

    #[test]
    fn non_e164_sms_recipient_is_invalid() {
        assert!(validate_sms_recipient("555-1234").is_err());
        assert!(validate_sms_recipient("+1555").is_err());
        assert!(validate_sms_recipient("+15551234567").is_ok());
    }

    #[test]
    fn schedule_beyond_horizon_is_invalid() {
        let now = OffsetDateTime::from_unix_timestamp(0).unwrap();
        assert!(validate_schedule_horizon(now + time::Duration::days(91), now, 90).is_err());
        assert!(validate_schedule_horizon(now + time::Duration::days(10), now, 90).is_ok());
    }
}
