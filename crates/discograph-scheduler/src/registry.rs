// SPDX-License-Identifier: GPL-3.0-or-later
//! Worker-pool loop structure, concurrency gating, and naming are grounded
//! in the teacher's job-registry executor (`tokio::sync::Semaphore` gate +
//! a per-job spawn), adapted from an in-memory interval list to polling a
//! durable queue table (§4.5).

use std::sync::Arc;
use std::time::Duration;

use discograph_domain::JobType;
use discograph_store::queue::JobQueue;
use discograph_store::repositories::ImageStore;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, warn};

use crate::job::{ImageProcessor, JobProcessor};

/// One of the three queue-driven pools (canonical, text, artwork-url).
pub struct Pool {
    name: &'static str,
    job_types: &'static [JobType],
    concurrency: usize,
    poll_interval: Duration,
    queue: Arc<dyn JobQueue>,
    processor: Arc<dyn JobProcessor>,
}

impl Pool {
    pub fn new(
        name: &'static str,
        job_types: &'static [JobType],
        concurrency: usize,
        poll_interval: Duration,
        queue: Arc<dyn JobQueue>,
        processor: Arc<dyn JobProcessor>,
    ) -> Self {
        Self {
            name,
            job_types,
            concurrency,
            poll_interval,
            queue,
            processor,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut ticker = interval(self.poll_interval);

        loop {
            ticker.tick().await;

            let permit = match semaphore.clone().try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => continue, // every slot busy; wait for the next tick
            };

            match self.queue.claim(self.job_types).await {
                Ok(Some(job)) => {
                    let queue = self.queue.clone();
                    let processor = self.processor.clone();
                    let pool_name = self.name;
                    let job_id = job.id;

                    tokio::spawn(async move {
                        let _permit = permit;
                        debug!(target: "scheduler", pool = pool_name, %job_id, job_type = %job.job_type, "claimed job");

                        match processor.process(job).await {
                            Ok(()) => {
                                if let Err(err) = queue.complete(job_id).await {
                                    error!(target: "scheduler", pool = pool_name, %job_id, error = %err, "failed to mark job completed");
                                }
                            }
                            Err(err) => {
                                if let Err(inner) = queue.fail(job_id, &err.to_string()).await {
                                    error!(target: "scheduler", pool = pool_name, %job_id, error = %inner, "failed to mark job failed");
                                }
                            }
                        }
                    });
                }
                Ok(None) => {
                    drop(permit); // nothing pending; release the slot immediately
                }
                Err(err) => {
                    drop(permit);
                    warn!(target: "scheduler", pool = self.name, error = %err, "claim failed");
                }
            }
        }
    }
}

/// The artwork-binary pool: polls the images table instead of the job
/// queue, since the binary downloader is keyed by image row rather than a
/// queued fetch (§4.5).
pub struct ImagePool {
    concurrency: usize,
    poll_interval: Duration,
    images: Arc<dyn ImageStore>,
    processor: Arc<dyn ImageProcessor>,
}

impl ImagePool {
    pub fn new(
        concurrency: usize,
        poll_interval: Duration,
        images: Arc<dyn ImageStore>,
        processor: Arc<dyn ImageProcessor>,
    ) -> Self {
        Self {
            concurrency,
            poll_interval,
            images,
            processor,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut ticker = interval(self.poll_interval);

        loop {
            ticker.tick().await;

            let permit = match semaphore.clone().try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => continue,
            };

            match self.images.next_pending_download().await {
                Ok(Some(image)) => {
                    let processor = self.processor.clone();
                    let image_id = image.id;

                    tokio::spawn(async move {
                        let _permit = permit;
                        if let Err(err) = processor.download(image).await {
                            warn!(target: "scheduler", pool = "artwork-binary", %image_id, error = %err, "image download failed");
                        }
                    });
                }
                Ok(None) => drop(permit),
                Err(err) => {
                    drop(permit);
                    warn!(target: "scheduler", pool = "artwork-binary", error = %err, "pending-download lookup failed");
                }
            }
        }
    }
}
