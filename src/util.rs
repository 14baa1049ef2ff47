//! Small stateless helpers shared by the decoders.

/// Maximum number of positions in a pipe-delimited status triad.
pub const TRIAD_LEN: usize = 3;

/// Split a pipe-delimited response string into at most three segments.
///
/// Several remote calls answer with `id|code|message`. The message is the
/// last segment and may itself contain `|`, so splitting stops after the
/// second delimiter. Fewer segments are returned as-is.
pub fn split_pipes(raw: &str) -> Vec<&str> {
    raw.splitn(TRIAD_LEN, '|').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_full_triad() {
        assert_eq!(split_pipes("0|100|Save failed"), vec!["0", "100", "Save failed"]);
    }

    #[test]
    fn test_split_keeps_empty_segments() {
        assert_eq!(split_pipes("57||"), vec!["57", "", ""]);
    }

    #[test]
    fn test_split_short_input() {
        assert_eq!(split_pipes("57"), vec!["57"]);
        assert_eq!(split_pipes(""), vec![""]);
    }

    #[test]
    fn test_split_message_with_pipe() {
        assert_eq!(split_pipes("0|7|a|b"), vec!["0", "7", "a|b"]);
    }
}
