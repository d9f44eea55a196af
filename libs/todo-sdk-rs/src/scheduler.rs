use std::ops::ControlFlow;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A callback run on a fixed period until it breaks or the task is dropped.
///
/// The first run happens immediately. Dropping the task aborts it.
#[derive(Debug)]
pub struct RecurringTask {
    handle: JoinHandle<()>,
}

impl RecurringTask {
    pub fn spawn<F>(runtime: &Handle, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let handle = runtime.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if tick().is_break() {
                    break;
                }
            }
        });

        Self { handle }
    }

    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RecurringTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
