use async_trait::async_trait;
use cs_core::{ChoiceCommand, ImageCommand, TextCommand};

/// Presentation-side callbacks driven by the engine.
///
/// The async methods are completion signals: the engine does not move past
/// the current batch until they resolve. `show_choice` is fire-and-forget —
/// the resolution comes back later through `set_variable` and the next
/// `advance`.
#[async_trait]
pub trait ChatEventListener: Send + Sync {
    async fn show_text(&self, command: &TextCommand);
    async fn show_image(&self, command: &ImageCommand);
    fn show_choice(&self, command: &ChoiceCommand);
    async fn on_end_chat(&self);
}
