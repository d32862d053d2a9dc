//! Form actions: validate the input, forward it to the search service and
//! answer with a [`Message`] the caller can show as-is.

pub mod collections;
pub mod documents;
pub mod keys;
pub mod overrides;
pub mod synonyms;
pub mod system;

use crate::utils::error::{AdminError, Result};
use crate::utils::message::Message;

pub const INVALID_DATA_MESSAGE: &str = "Invalid data, please fix before resubmission";

pub(crate) fn failure(err: AdminError) -> Message {
    tracing::error!(
        "❌ Action failed: {} (Category: {:?}, Severity: {:?})",
        err,
        err.category(),
        err.severity()
    );
    Message::error(err.user_friendly_message())
}

/// 所有錯誤都轉成錯誤訊息，呼叫端一定會拿到結果
pub(crate) fn respond(result: Result<Message>) -> Message {
    result.unwrap_or_else(failure)
}
