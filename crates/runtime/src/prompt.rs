//! System instruction for the assistant.

use transcript::Message;

use crate::Result;

const POLICY: &str = "\
CORE RESPONSIBILITIES:
1. Maintain natural conversation flow - REFERENCE previous messages when relevant
2. PROACTIVELY use available tools to accomplish tasks
3. If you encounter a NAME and you need their details, use tool \"search_contacts\" first
4. If information is missing, ask CLARIFYING questions before taking action
5. ALWAYS check for required PARAMETERS before calling tools
6. Use MULTIPLE tools SEQUENTIALLY if necessary to fulfill user requests";

/// Build the system instruction with the conversation so far embedded.
pub fn system_instruction(history: &[Message]) -> Result<String> {
    let history = serde_json::to_string_pretty(history)?;
    Ok(format!(
        "You are a helpful corporate assistant with access to Google Workspace tools \
         (Gmail, Calendar, Drive, Contacts, Tasks).\n\
         CONVERSATION HISTORY:\n\
         {history}\n\n\
         {POLICY}\n"
    ))
}
