// SPDX-License-Identifier: GPL-3.0-or-later
//! The four worker pools of §4.5: canonical, text, artwork-url (all three
//! polling the durable job queue) and artwork-binary (polling the images
//! table directly). Concurrency gating and the polling-loop shape are
//! grounded in the teacher's in-memory job registry, generalized from an
//! interval scheduler to a queue poller.

pub mod job;
pub mod jobs;
pub mod registry;

pub use job::{ImageProcessor, JobProcessor};
pub use jobs::Scheduler;
pub use registry::{ImagePool, Pool};
