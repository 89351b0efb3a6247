// SPDX-License-Identifier: GPL-3.0-or-later
//! Wires the four worker pools of §4.5 to concrete concurrency and poll
//! intervals. The processors themselves are supplied by the caller (the
//! orchestrator), not constructed here — this module only owns the
//! schedule.

use std::sync::Arc;
use std::time::Duration;

use discograph_domain::JobType;
use discograph_store::queue::JobQueue;
use discograph_store::repositories::ImageStore;
use tokio::task::JoinHandle;

use crate::job::{ImageProcessor, JobProcessor};
use crate::registry::{ImagePool, Pool};

/// Starts all four pools and returns their join handles so the caller can
/// await them (or let them run for the process lifetime).
pub struct Scheduler {
    queue: Arc<dyn JobQueue>,
    images: Arc<dyn ImageStore>,
}

impl Scheduler {
    pub fn new(queue: Arc<dyn JobQueue>, images: Arc<dyn ImageStore>) -> Self {
        Self { queue, images }
    }

    pub fn spawn_all(
        &self,
        canonical_processor: Arc<dyn JobProcessor>,
        text_processor: Arc<dyn JobProcessor>,
        artwork_url_processor: Arc<dyn JobProcessor>,
        image_processor: Arc<dyn ImageProcessor>,
    ) -> Vec<JoinHandle<()>> {
        vec![
            Pool::new(
                "canonical",
                JobType::CANONICAL,
                1,
                Duration::from_millis(1000),
                self.queue.clone(),
                canonical_processor,
            )
            .spawn(),
            Pool::new(
                "text",
                JobType::TEXT,
                2,
                Duration::from_millis(1000),
                self.queue.clone(),
                text_processor,
            )
            .spawn(),
            Pool::new(
                "artwork-url",
                JobType::ARTWORK_URL,
                2,
                Duration::from_millis(500),
                self.queue.clone(),
                artwork_url_processor,
            )
            .spawn(),
            ImagePool::new(3, Duration::from_millis(500), self.images.clone(), image_processor).spawn(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use discograph_domain::{EntityType, Image, ImageId, Job, JobId, JobMetadata, JobStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    struct CountingQueue {
        jobs: Mutex<Vec<Job>>,
        claims: AtomicUsize,
    }

    fn sample_job() -> Job {
        let artist_id = discograph_domain::ArtistId::new();
        Job {
            id: JobId::new(),
            job_type: JobType::FetchArtist,
            entity_type: EntityType::Artist,
            entity_id: artist_id.0,
            priority: 1,
            status: JobStatus::Pending,
            attempts: 0,
            max_attempts: 5,
            metadata: JobMetadata::FetchArtist { artist_id },
            error_message: None,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    #[async_trait]
    impl JobQueue for CountingQueue {
        async fn enqueue(&self, _priority: i32, _metadata: JobMetadata) -> anyhow::Result<JobId> {
            unimplemented!()
        }

        async fn claim(&self, _job_types: &[JobType]) -> anyhow::Result<Option<Job>> {
            self.claims.fetch_add(1, Ordering::SeqCst);
            Ok(self.jobs.lock().await.pop())
        }

        async fn complete(&self, _id: JobId) -> anyhow::Result<()> {
            Ok(())
        }

        async fn fail(&self, _id: JobId, _err_msg: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn reset_stuck(&self) -> anyhow::Result<u64> {
            Ok(0)
        }

        async fn gc(&self) -> anyhow::Result<u64> {
            Ok(0)
        }

        async fn stats(&self) -> anyhow::Result<discograph_store::queue::JobQueueStats> {
            Ok(discograph_store::queue::JobQueueStats::default())
        }

        async fn recent(&self, _limit: i64) -> anyhow::Result<Vec<Job>> {
            Ok(Vec::new())
        }

        async fn clear_completed(&self) -> anyhow::Result<u64> {
            Ok(0)
        }
    }

    struct RecordingProcessor {
        processed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl JobProcessor for RecordingProcessor {
        async fn process(&self, _job: Job) -> anyhow::Result<()> {
            self.processed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct NoOpImageStore;

    #[async_trait]
    impl ImageStore for NoOpImageStore {
        async fn upsert_image_url(&self, _image: &Image) -> anyhow::Result<()> {
            Ok(())
        }

        async fn mark_image_cached(&self, _id: ImageId, _local_path: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn mark_image_failed(&self, _id: ImageId, _reason: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn list_images(
            &self,
            _entity_type: EntityType,
            _entity_id: uuid::Uuid,
        ) -> anyhow::Result<Vec<Image>> {
            Ok(Vec::new())
        }

        async fn list_images_for_entities(
            &self,
            _entity_type: EntityType,
            _entity_ids: &[uuid::Uuid],
        ) -> anyhow::Result<Vec<Image>> {
            Ok(Vec::new())
        }

        async fn next_pending_download(&self) -> anyhow::Result<Option<Image>> {
            Ok(None)
        }

        async fn delete_image(&self, _id: ImageId) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct NoOpImageProcessor;

    #[async_trait]
    impl ImageProcessor for NoOpImageProcessor {
        async fn download(&self, _image: Image) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn a_claimed_job_is_handed_to_the_processor() {
        let processed = Arc::new(AtomicUsize::new(0));
        let queue = Arc::new(CountingQueue {
            jobs: Mutex::new(vec![sample_job()]),
            claims: AtomicUsize::new(0),
        });

        let scheduler = Scheduler::new(queue.clone(), Arc::new(NoOpImageStore));
        let handles = scheduler.spawn_all(
            Arc::new(RecordingProcessor { processed: processed.clone() }),
            Arc::new(RecordingProcessor { processed: processed.clone() }),
            Arc::new(RecordingProcessor { processed: processed.clone() }),
            Arc::new(NoOpImageProcessor),
        );

        tokio::time::sleep(Duration::from_millis(1300)).await;
        for handle in handles {
            handle.abort();
        }

        assert_eq!(processed.load(Ordering::SeqCst), 1);
    }
}
