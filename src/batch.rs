use crate::domain::email::NormalizedRecord;
use crate::mail::extract::assemble_record;
use crate::mail::gmail::{MailProvider, ProviderError};

pub const DEFAULT_MAX_EMAILS: usize = 50;

#[derive(Debug, Default)]
pub struct UnreadBatch {
    /// Size of the unread listing before the cap was applied.
    pub listed: usize,
    /// Extracted records, in listing order.
    pub records: Vec<NormalizedRecord>,
}

/// List unread messages, fetch at most `max_emails` of them one by one and
/// extract a record from each. Listing order is preserved.
pub fn fetch_unread(
    provider: &dyn MailProvider,
    max_emails: usize,
) -> Result<UnreadBatch, ProviderError> {
    let listing = provider.list_unread()?;

    if listing.is_empty() {
        log::info!("no unread messages listed");
        return Ok(UnreadBatch::default());
    }

    let mut records = Vec::with_capacity(listing.len().min(max_emails));
    for msg_ref in listing.iter().take(max_emails) {
        let msg = provider.get_message(&msg_ref.id)?;
        records.push(assemble_record(&msg));
    }

    log::info!(
        "extracted {} of {} unread messages",
        records.len(),
        listing.len()
    );

    Ok(UnreadBatch {
        listed: listing.len(),
        records,
    })
}
