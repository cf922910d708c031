use crate::{logger, PromptCancelled};

/// Reports a failed command. Returns `true` when the failure was a user
/// cancellation, which callers treat as a clean exit.
pub fn log_error(error: anyhow::Error) -> bool {
    if error.downcast_ref::<PromptCancelled>().is_some() {
        logger::outro("Cancelled");
        return true;
    }

    logger::error(error.to_string());

    if error.chain().count() > 1 {
        logger::error_note(
            "Caused by:",
            &error
                .chain()
                .skip(1)
                .enumerate()
                .map(|(i, cause)| format!("  {i}: {}", cause))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }

    logger::outro("Failed to run command");
    false
}
