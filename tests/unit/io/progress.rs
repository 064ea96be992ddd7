//! Tests for progress tracking across batches of targets

#[cfg(test)]
mod tests {
    use photomosaic::algorithm::executor::Stage;
    use photomosaic::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
    use photomosaic::io::progress::ProgressManager;
    use std::path::Path;
    use std::time::Duration;

    // Tests ProgressManager construction and a full target lifecycle
    // Verified by setting wrong initial state
    #[test]
    fn test_progress_manager_lifecycle() {
        let mut pm = ProgressManager::new();

        pm.initialize(0);
        pm.finish();

        pm.initialize(1);
        assert_eq!(pm.target_count(), 1);
        pm.start_target(0, Path::new("target.jpg"));
        pm.advance(0, Stage::LoadTarget);
        pm.advance(0, Stage::Assemble);
        pm.complete_target(0, Duration::from_millis(100));
        pm.finish();
    }

    // Tests default trait implementation
    // Verified by creating different initial states
    #[test]
    fn test_progress_manager_default() {
        let mut pm = ProgressManager::default();
        pm.initialize(2);
        assert_eq!(pm.target_count(), 2);
        pm.start_target(1, Path::new("second.jpg"));
        pm.advance(1, Stage::WriteOutputs);
        pm.finish();
    }

    // Tests batch mode with more targets than individual bars
    // Verified by creating one bar per target
    #[test]
    fn test_batch_mode() {
        let mut pm = ProgressManager::new();
        let count = MAX_INDIVIDUAL_PROGRESS_BARS + 5;
        pm.initialize(count);

        for index in 0..count {
            pm.start_target(index, Path::new("batch.jpg"));
            pm.advance(index, Stage::PrepareTiles);
            pm.complete_target(index, Duration::from_millis(1));
        }
        pm.finish();
    }

    // Tests updates for unknown targets are ignored
    // Verified by indexing target states directly
    #[test]
    fn test_out_of_range_updates() {
        let mut pm = ProgressManager::new();
        pm.initialize(1);
        pm.advance(7, Stage::Assemble);
        pm.complete_target(9, Duration::ZERO);
        pm.finish();
    }

    // Tests task bars track their own length
    // Verified by creating task bars with zero length
    #[test]
    fn test_task_bar() {
        let pm = ProgressManager::new();
        let bar = pm.task_bar(12, "matching rows");
        bar.inc(5);
        assert_eq!(bar.length(), Some(12));
        assert_eq!(bar.position(), 5);
        bar.finish_and_clear();
    }
}
