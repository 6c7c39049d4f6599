const ELLIPSIS: char = '…';

/// Fit `s` into `width` cells, ending in an ellipsis when cut.
///
/// Counts chars rather than display width; names and emails are assumed to
/// be single-width.
pub fn truncate(s: &str, width: usize) -> String {
  let mut chars = s.chars();
  let head: String = chars.by_ref().take(width).collect();
  if chars.next().is_none() {
    return head;
  }
  if width == 0 {
    return String::new();
  }

  let mut cut: String = head.chars().take(width - 1).collect();
  cut.push(ELLIPSIS);
  cut
}
