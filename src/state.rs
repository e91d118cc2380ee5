use crate::tracker::PracticeTracker;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<PracticeTracker>,
}

impl AppState {
    pub fn new(tracker: PracticeTracker) -> Self {
        Self {
            tracker: Arc::new(tracker),
        }
    }
}
