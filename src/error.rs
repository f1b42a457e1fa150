use thiserror::Error;

/// Failures the gallery absorbs into degraded visual state.
///
/// None of these cross the controller boundary: media failures become a
/// placeholder node, autoplay rejection becomes a tap-to-play node, and a
/// missing measurement simply defers the next layout pass.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MediaError {
    #[error("failed to load media {url}: {reason}")]
    LoadFailure { url: String, reason: String },

    #[error("autoplay rejected for {url}")]
    AutoplayRejected { url: String },

    #[error("container width is not measurable yet")]
    MeasurementUnavailable,
}

impl MediaError {
    pub fn load_failure(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::LoadFailure {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_failure_message() {
        let err = MediaError::load_failure("a.png", "truncated file");
        assert_eq!(err.to_string(), "failed to load media a.png: truncated file");
    }
}
