//! Application state shared by the request handlers.

use chatppt_core::{ConversationState, DeckBuilder, Generator, Turn};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinError;

/// Any deck builder that can be used from the blocking pool.
pub type BoxedBuilder = Box<dyn DeckBuilder + Send + Sync>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    generator: Arc<Generator<BoxedBuilder>>,

    /// Held for the whole of a generation. Builds share the output
    /// directory, so they run one at a time.
    generation_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(generator: Generator<BoxedBuilder>) -> Self {
        Self {
            generator: Arc::new(generator),
            generation_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Run one generation on the blocking pool.
    pub async fn generate(
        &self,
        text: String,
        state: ConversationState,
    ) -> Result<(Vec<Turn>, ConversationState), JoinError> {
        // The guard moves into the blocking task, so a dropped request does
        // not release the lock while its build is still running.
        let guard = Arc::clone(&self.generation_lock).lock_owned().await;
        let generator = Arc::clone(&self.generator);

        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            generator.generate(&text, state)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatppt_core::{Result, Settings};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Sleeps while counting how many builds overlap.
    struct SlowBuilder {
        running: Arc<AtomicUsize>,
        max_running: Arc<AtomicUsize>,
    }

    impl DeckBuilder for SlowBuilder {
        fn build(&self, _outline_path: &Path) -> Result<()> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(300));
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_cancelled_request_keeps_lock_until_build_ends() {
        let tmp = TempDir::new().unwrap();
        let max_running = Arc::new(AtomicUsize::new(0));
        let builder = SlowBuilder {
            running: Arc::new(AtomicUsize::new(0)),
            max_running: Arc::clone(&max_running),
        };
        let app = AppState::new(Generator::new(Settings::new(tmp.path()), Box::new(builder)));

        let first = tokio::time::timeout(
            Duration::from_millis(50),
            app.generate("first".to_string(), ConversationState::new()),
        )
        .await;
        assert!(first.is_err());

        let (history, _) = app
            .generate("second".to_string(), ConversationState::new())
            .await
            .unwrap();

        assert_eq!(history[0].text, "second");
        assert_eq!(max_running.load(Ordering::SeqCst), 1);
    }
}
