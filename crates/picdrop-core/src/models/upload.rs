//! Upload lifecycle models: submitted files, per-task status, batch outcome.

use bytes::Bytes;

/// One submitted file: original name, declared MIME type, and contents.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl FileInput {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        FileInput {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Lifecycle status of a single upload task.
///
/// Transitions are monotonic: Pending -> InProgress -> Succeeded | Failed.
/// Once a terminal state is reached no further transition is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}

impl UploadStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, UploadStatus::Succeeded | UploadStatus::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            UploadStatus::Pending => 0,
            UploadStatus::InProgress => 1,
            UploadStatus::Succeeded | UploadStatus::Failed => 2,
        }
    }

    /// Advance to `next` if the transition is monotonic. Returns the status
    /// actually in effect afterwards; illegal transitions are ignored.
    pub fn advance(self, next: UploadStatus) -> UploadStatus {
        if self.is_terminal() || next.rank() < self.rank() {
            self
        } else {
            next
        }
    }
}

/// Aggregate result of one upload batch: counts only, individual errors are
/// logged by the orchestrator rather than itemized here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub success_count: usize,
    pub failure_count: usize,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }

    pub fn all_succeeded(&self) -> bool {
        self.failure_count == 0
    }

    /// Human-readable batch summary.
    pub fn summary(&self) -> String {
        if self.failure_count == 0 {
            format!(
                "Successfully uploaded {} {}",
                self.success_count,
                if self.success_count == 1 { "image" } else { "images" }
            )
        } else {
            format!("{} uploaded, {} failed", self.success_count, self.failure_count)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_monotonic_transitions() {
        let status = UploadStatus::Pending;
        let status = status.advance(UploadStatus::InProgress);
        assert_eq!(status, UploadStatus::InProgress);

        let status = status.advance(UploadStatus::Succeeded);
        assert_eq!(status, UploadStatus::Succeeded);

        // Terminal states never regress.
        assert_eq!(status.advance(UploadStatus::Pending), UploadStatus::Succeeded);
        assert_eq!(status.advance(UploadStatus::Failed), UploadStatus::Succeeded);

        let failed = UploadStatus::InProgress.advance(UploadStatus::Failed);
        assert_eq!(failed.advance(UploadStatus::InProgress), UploadStatus::Failed);
    }

    #[test]
    fn test_status_ignores_regression_to_pending() {
        let status = UploadStatus::InProgress;
        assert_eq!(status.advance(UploadStatus::Pending), UploadStatus::InProgress);
    }

    #[test]
    fn test_outcome_summary_all_succeeded() {
        let outcome = BatchOutcome {
            success_count: 1,
            failure_count: 0,
        };
        assert_eq!(outcome.summary(), "Successfully uploaded 1 image");

        let outcome = BatchOutcome {
            success_count: 3,
            failure_count: 0,
        };
        assert_eq!(outcome.summary(), "Successfully uploaded 3 images");
        assert!(outcome.all_succeeded());
    }

    #[test]
    fn test_outcome_summary_partial_failure() {
        let outcome = BatchOutcome {
            success_count: 1,
            failure_count: 2,
        };
        assert_eq!(outcome.summary(), "1 uploaded, 2 failed");
        assert_eq!(outcome.total(), 3);
        assert!(!outcome.all_succeeded());
    }

    #[test]
    fn test_file_input_size() {
        let file = FileInput::new("a.png", "image/png", vec![0u8; 42]);
        assert_eq!(file.size(), 42);
    }
}
