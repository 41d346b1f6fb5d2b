//! Async facade over a blocking [`SongStore`].

use super::trait_def::SongStore;
use super::SongStoreError;
use crate::song::{NewSong, Song, SongFilter, SongForUpdate};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// How long past the deadline the caller keeps waiting for the store's own
/// answer. A store call that started committing just before the deadline
/// reports its real outcome instead of a timeout.
const STORE_RESULT_GRACE: Duration = Duration::from_millis(500);

/// Runs store operations on the blocking thread pool, each bounded by a
/// timeout.
///
/// The timeout becomes one absolute deadline, taken before the task is
/// queued and handed to the store. The store refuses to start or commit work
/// past it, so a caller told `SongStoreError::Timeout` never sees the write
/// land later.
#[derive(Clone)]
pub struct SongRepository {
    store: Arc<dyn SongStore>,
    timeout: Duration,
}

impl SongRepository {
    pub fn new(store: Arc<dyn SongStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    async fn run<T, F>(&self, op: F) -> Result<T, SongStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn SongStore, Instant) -> Result<T, SongStoreError> + Send + 'static,
    {
        let deadline = Instant::now() + self.timeout;
        let store = Arc::clone(&self.store);
        let task = tokio::task::spawn_blocking(move || op(store.as_ref(), deadline));

        let give_up_at = tokio::time::Instant::from_std(deadline + STORE_RESULT_GRACE);
        match tokio::time::timeout_at(give_up_at, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) if join_err.is_panic() => {
                std::panic::resume_unwind(join_err.into_panic())
            }
            Ok(Err(join_err)) => Err(SongStoreError::Task(join_err.to_string())),
            Err(_) => {
                warn!("Song store operation exceeded {:?}", self.timeout);
                Err(SongStoreError::Timeout)
            }
        }
    }

    pub async fn add_song(&self, song: NewSong) -> Result<Song, SongStoreError> {
        self.run(move |store, deadline| store.add_song(&song, deadline))
            .await
    }

    pub async fn get_songs(
        &self,
        filter: SongFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Song>, SongStoreError> {
        self.run(move |store, deadline| store.get_songs(&filter, limit, offset, deadline))
            .await
    }

    pub async fn delete_song(&self, id: i64) -> Result<i64, SongStoreError> {
        self.run(move |store, deadline| store.delete_song(id, deadline))
            .await
    }

    pub async fn get_song_text(&self, id: i64) -> Result<String, SongStoreError> {
        self.run(move |store, deadline| store.get_song_text(id, deadline))
            .await
    }

    pub async fn update_song(
        &self,
        id: i64,
        update: SongForUpdate,
    ) -> Result<i64, SongStoreError> {
        self.run(move |store, deadline| store.update_song(id, &update, deadline))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song_store::MockSongStore;

    fn repository(store: MockSongStore, timeout: Duration) -> SongRepository {
        SongRepository::new(Arc::new(store), timeout)
    }

    #[tokio::test]
    async fn forwards_results_from_store() {
        let mut store = MockSongStore::new();
        store
            .expect_get_song_text()
            .withf(|id, _| *id == 7)
            .returning(|_, _| Ok("verse".to_string()));
        store
            .expect_delete_song()
            .returning(|id, _| Err(SongStoreError::NotFound(id)));

        let repo = repository(store, Duration::from_secs(1));
        assert_eq!(repo.get_song_text(7).await.unwrap(), "verse");
        assert!(matches!(
            repo.delete_song(3).await,
            Err(SongStoreError::NotFound(3))
        ));
    }

    #[tokio::test]
    async fn slow_store_times_out() {
        let mut store = MockSongStore::new();
        store.expect_get_songs().returning(|_, _, _, _| {
            std::thread::sleep(Duration::from_millis(1500));
            Ok(vec![])
        });

        let repo = repository(store, Duration::from_millis(20));
        let result = repo.get_songs(SongFilter::default(), 10, 0).await;
        assert!(matches!(result, Err(SongStoreError::Timeout)));
    }

    #[tokio::test]
    async fn store_receives_deadline_from_timeout() {
        let mut store = MockSongStore::new();
        store
            .expect_delete_song()
            .withf(|_, deadline| {
                let remaining = deadline.saturating_duration_since(Instant::now());
                remaining > Duration::from_secs(1) && remaining <= Duration::from_secs(2)
            })
            .returning(|id, _| Ok(id));

        let repo = repository(store, Duration::from_secs(2));
        assert_eq!(repo.delete_song(5).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn store_timeout_within_grace_is_reported_as_is() {
        let mut store = MockSongStore::new();
        store.expect_add_song().returning(|_, deadline| {
            std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
            Err(SongStoreError::Timeout)
        });

        let repo = repository(store, Duration::from_millis(50));
        let song = NewSong {
            song: "Hysteria".to_string(),
            group: "Muse".to_string(),
            release_date: String::new(),
            text: String::new(),
            link: String::new(),
        };
        let result = repo.add_song(song).await;
        assert!(matches!(result, Err(SongStoreError::Timeout)));
    }

    #[tokio::test]
    async fn store_panic_is_propagated() {
        let mut store = MockSongStore::new();
        store
            .expect_update_song()
            .returning(|_, _, _| panic!("boom"));

        let repo = repository(store, Duration::from_secs(1));
        let handle = tokio::spawn(async move {
            repo.update_song(1, SongForUpdate::default()).await
        });
        let err = handle.await.unwrap_err();
        assert!(err.is_panic());
    }
}
