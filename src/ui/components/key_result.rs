/// What a component did with a key.
///
/// Overlays (dialog, prompt) return this so the list view knows whether to
/// act on an event, stop, or keep routing the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed, nothing for the parent to do
  Handled,
  /// Consumed and produced an event for the parent
  Event(T),
  /// Not consumed; try the next handler
  NotHandled,
}
