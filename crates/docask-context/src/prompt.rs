//! Prompt Builder: deterministic rendering of the final user message.

use docask_core::error::{Error, Result};

use crate::assembler::AssembledContext;

/// Render the message sent to the language model: the context block exactly
/// as assembled, then an instruction section naming the literal query.
///
/// Pure function; identical inputs produce byte-identical output. An
/// all-whitespace query is an upstream contract breach and is rejected.
pub fn build_user_message(context: &AssembledContext, query: &str) -> Result<String> {
    if query.trim().is_empty() {
        return Err(Error::EmptyQuery);
    }

    let mut message = String::with_capacity(context.rendered.len() + query.len() + 256);
    message.push_str("Context:\n");
    message.push_str(&context.rendered);
    if !context.rendered.ends_with('\n') {
        message.push('\n');
    }
    message.push_str("\nQuestion:\n");
    message.push_str(query);
    message.push_str(
        "\n\nAnswer the question using only the context above. \
         Cite every claim as [Source N]. \
         If the context does not contain the information, say that it is not available.\n",
    );
    Ok(message)
}
