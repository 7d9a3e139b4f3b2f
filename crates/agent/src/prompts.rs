use quotedraft_core::QuoteDraftPayload;

use crate::llm::ChatMessage;

pub const DRAFT_SYSTEM_PROMPT: &str = "You are a professional sales engineer. \
Write a short email (max 200 words) summarizing the quotation. \
Write it in the language requested by the client (en or ar). \
Include the total amount, the delivery terms and any special notes.";

/// System instruction plus the full payload as JSON. Non-ASCII text such as
/// Arabic names is kept verbatim.
pub fn draft_messages(payload: &QuoteDraftPayload) -> Result<Vec<ChatMessage>, serde_json::Error> {
    let body = serde_json::to_string(payload)?;
    Ok(vec![ChatMessage::system(DRAFT_SYSTEM_PROMPT), ChatMessage::user(body)])
}
