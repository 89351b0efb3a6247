// SPDX-License-Identifier: GPL-3.0-or-later
//! The processor interfaces a pool calls into. The pool owns *that* a job
//! gets processed; it never owns *which* adapter or store call does the
//! work, which breaks the cyclic dependency a naive design would have
//! between the queue and the orchestrator that depends on it (§9 Design
//! Notes).

use anyhow::Result;
use async_trait::async_trait;
use discograph_domain::{Image, Job};

/// Does the work behind one claimed job-queue row. Implemented by the
/// orchestrator; a pool only knows the job types it's allowed to claim, not
/// how any particular type is fulfilled.
#[async_trait]
pub trait JobProcessor: Send + Sync {
    async fn process(&self, job: Job) -> Result<()>;
}

/// Does the work behind one pending image row. The artwork-binary pool
/// polls `ImageStore::next_pending_download` directly rather than the job
/// queue (§4.5), so it gets its own, narrower processor interface.
#[async_trait]
pub trait ImageProcessor: Send + Sync {
    async fn download(&self, image: Image) -> Result<()>;
}
