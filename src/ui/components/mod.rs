mod confirm_prompt;
mod input;
mod key_result;
mod toasts;
mod user_dialog;

pub use confirm_prompt::{ConfirmEvent, ConfirmPrompt};
pub use key_result::KeyResult;
pub use toasts::render_toasts;
pub use user_dialog::{DialogEvent, Submission, UserDialog};
