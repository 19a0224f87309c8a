//! Fixed-size worker pool for verifying many files at once
//!
//! Paths are spread over a dedicated rayon pool, so results arrive in no
//! particular order. An interrupt flag stops dispatch; a job that finishes
//! after the flag is set reports `NOT_A_CANDIDATE` instead of its own result,
//! so nothing half-done counts as a pass or a fail.

use crate::verifier::Verification;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Pool {
    workers: usize,
    interrupt: Arc<AtomicBool>,
}

impl Pool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Shared flag a signal handler can set to stop the pool
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }

    /// Run `job` over every path and collect the results, in no particular order
    pub fn run<F>(&self, paths: &[PathBuf], job: F) -> Vec<Verification>
    where
        F: Fn(&Path) -> Verification + Sync,
    {
        self.run_with(paths, job, |_| {})
    }

    /// Like [`Pool::run`], calling `on_result` from the worker for every
    /// result that survives the interrupt check.
    ///
    /// Discarded results never reach `on_result`.
    pub fn run_with<F, G>(&self, paths: &[PathBuf], job: F, on_result: G) -> Vec<Verification>
    where
        F: Fn(&Path) -> Verification + Sync,
        G: Fn(&Verification) + Sync,
    {
        let verify_one = |path: &PathBuf| -> Option<Verification> {
            if self.is_interrupted() {
                return None;
            }

            let result = job(path);
            if self.is_interrupted() {
                return Some(Verification::not_a_candidate(path));
            }
            on_result(&result);
            Some(result)
        };

        match rayon::ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(|| paths.par_iter().filter_map(verify_one).collect()),
            // No threads to be had; verify on the calling thread instead
            Err(_) => paths.iter().filter_map(verify_one).collect(),
        }
    }
}
