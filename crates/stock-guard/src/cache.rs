//! # Cache Invalidation
//!
//! After the install scan hides products, storefront pages rendered earlier still show
//! them. [`CacheInvalidator`] asks the host to drop its render caches and clears the
//! on-disk artifacts listed in [`CachePaths`]:
//!
//! 1. host render caches (templates, compiled templates, pages), when the port is wired
//! 2. the class index file, deleted
//! 3. each cache directory, emptied recursively but kept in place. An entry that cannot
//!    be removed is reported on its own and the rest of the directory is still cleared.
//!
//! Every step runs even if an earlier one failed. Failures are logged as warnings and
//! collected in the [`CacheReport`]; nothing is propagated.

use crate::config::CachePaths;
use crate::journal::Journal;
use shop_host::{HostError, RenderCache, Severity};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument};

/// One failed invalidation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheFailure {
    pub target: String,
    pub error: String,
}

/// Summary of one invalidation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheReport {
    /// Targets that were cleared (or had nothing to clear).
    pub cleared: Vec<String>,
    pub failures: Vec<CacheFailure>,
    /// Entries removed from the cache directories.
    pub removed_entries: usize,
}

impl CacheReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone)]
pub struct CacheInvalidator {
    render_cache: Option<Arc<dyn RenderCache>>,
    paths: CachePaths,
    journal: Journal,
}

impl CacheInvalidator {
    pub fn new(
        render_cache: Option<Arc<dyn RenderCache>>,
        paths: CachePaths,
        journal: Journal,
    ) -> Self {
        Self {
            render_cache,
            paths,
            journal,
        }
    }

    #[instrument(skip_all)]
    pub async fn invalidate(&self) -> CacheReport {
        let mut report = CacheReport::default();

        if let Some(render_cache) = &self.render_cache {
            let result = render_cache
                .invalidate_render_caches()
                .await
                .map_err(|err: HostError| err.to_string());
            self.record(&mut report, "render caches", result);
        }

        let class_index = self.paths.class_index.display().to_string();
        let result = remove_file_if_exists(&self.paths.class_index)
            .await
            .map_err(|err| err.to_string());
        self.record(&mut report, &class_index, result);

        for dir in &self.paths.directories {
            let target = dir.display().to_string();
            match empty_dir(dir).await {
                Ok(sweep) => {
                    report.removed_entries += sweep.removed;
                    if sweep.failed.is_empty() {
                        self.record(&mut report, &target, Ok(()));
                    }
                    for (entry, err) in sweep.failed {
                        self.record(&mut report, &entry.display().to_string(), Err(err.to_string()));
                    }
                }
                Err(err) => self.record(&mut report, &target, Err(err.to_string())),
            }
        }

        if report.is_clean() {
            self.journal
                .module(Severity::Info, "Cache cleared after initial scan");
        } else {
            self.journal.module(
                Severity::Warning,
                format_args!(
                    "Cache clearing finished with {} failed step(s)",
                    report.failures.len()
                ),
            );
        }
        report
    }

    fn record(&self, report: &mut CacheReport, target: &str, result: Result<(), String>) {
        match result {
            Ok(()) => {
                debug!(step = target, "Cleared");
                report.cleared.push(target.to_string());
            }
            Err(error) => {
                self.journal.module(
                    Severity::Warning,
                    format_args!("Error clearing cache ({target}): {error}"),
                );
                report.failures.push(CacheFailure {
                    target: target.to_string(),
                    error,
                });
            }
        }
    }
}

async fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Result of emptying one cache directory.
#[derive(Debug, Default)]
struct DirSweep {
    removed: usize,
    /// Entries that could not be removed. The sweep carries on past them.
    failed: Vec<(PathBuf, io::Error)>,
}

/// Removes everything inside `dir` and keeps `dir`. A missing directory has nothing to clear.
///
/// Only failing to read the directory itself is an error.
async fn empty_dir(dir: &Path) -> io::Result<DirSweep> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(DirSweep::default()),
        Err(err) => return Err(err),
    };

    let mut sweep = DirSweep::default();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        match remove_entry(&entry).await {
            Ok(()) => sweep.removed += 1,
            Err(err) => sweep.failed.push((path, err)),
        }
    }
    Ok(sweep)
}

async fn remove_entry(entry: &tokio::fs::DirEntry) -> io::Result<()> {
    if entry.file_type().await?.is_dir() {
        tokio::fs::remove_dir_all(entry.path()).await
    } else {
        tokio::fs::remove_file(entry.path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuardConfig;
    use shop_host::mock::{MockShop, RecordingLogSink};
    use std::fs;

    fn invalidator(
        render_cache: Option<MockShop>,
        root: &Path,
        log: &RecordingLogSink,
    ) -> CacheInvalidator {
        let paths = GuardConfig::default().with_cache_dir(root).cache_paths();
        CacheInvalidator::new(
            render_cache.map(|shop| Arc::new(shop) as Arc<dyn RenderCache>),
            paths,
            Journal::new(Arc::new(log.clone()), "test"),
        )
    }

    fn seed_cache(root: &Path) {
        fs::create_dir_all(root.join("smarty/cache/nested")).unwrap();
        fs::create_dir_all(root.join("smarty/compile")).unwrap();
        fs::write(root.join("class_index.php"), "<?php return [];").unwrap();
        fs::write(root.join("smarty/cache/page.html"), "cached").unwrap();
        fs::write(root.join("smarty/cache/nested/fragment.html"), "cached").unwrap();
        fs::write(root.join("smarty/compile/tpl.php"), "compiled").unwrap();
    }

    #[tokio::test]
    async fn test_clears_files_and_keeps_directories() {
        let tmp = tempfile::tempdir().unwrap();
        seed_cache(tmp.path());
        let shop = MockShop::new();
        let log = RecordingLogSink::new();

        let report = invalidator(Some(shop.clone()), tmp.path(), &log)
            .invalidate()
            .await;

        assert!(report.is_clean());
        assert_eq!(report.cleared.len(), 4);
        assert_eq!(report.removed_entries, 3);
        assert_eq!(shop.render_cache_calls(), 1);
        assert!(!tmp.path().join("class_index.php").exists());
        assert!(tmp.path().join("smarty/cache").is_dir());
        assert!(tmp.path().join("smarty/compile").is_dir());
        assert_eq!(fs::read_dir(tmp.path().join("smarty/cache")).unwrap().count(), 0);
        assert_eq!(fs::read_dir(tmp.path().join("smarty/compile")).unwrap().count(), 0);
        assert_eq!(log.count(Severity::Info), 1);
    }

    #[tokio::test]
    async fn test_missing_artifacts_are_not_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let log = RecordingLogSink::new();

        let report = invalidator(None, tmp.path(), &log).invalidate().await;

        assert!(report.is_clean());
        assert_eq!(report.cleared.len(), 3);
        assert_eq!(report.removed_entries, 0);
    }

    #[tokio::test]
    async fn test_failed_step_does_not_stop_the_others() {
        let tmp = tempfile::tempdir().unwrap();
        seed_cache(tmp.path());
        let shop = MockShop::new().fail_render_cache("cache service down");
        let log = RecordingLogSink::new();

        let report = invalidator(Some(shop), tmp.path(), &log).invalidate().await;

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].target, "render caches");
        assert!(report.failures[0].error.contains("cache service down"));
        assert!(!tmp.path().join("class_index.php").exists());
        assert_eq!(fs::read_dir(tmp.path().join("smarty/compile")).unwrap().count(), 0);
        // One warning for the step, one for the summary.
        assert_eq!(log.count(Severity::Warning), 2);
        assert_eq!(log.count(Severity::Error), 0);
    }

    #[tokio::test]
    async fn test_cache_dir_that_is_a_file_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("smarty")).unwrap();
        fs::write(tmp.path().join("smarty/cache"), "not a directory").unwrap();
        let log = RecordingLogSink::new();

        let report = invalidator(None, tmp.path(), &log).invalidate().await;

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].target.ends_with("cache"));
        assert!(tmp.path().join("smarty/cache").is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_locked_entry_does_not_stop_directory_sweep() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let cache = tmp.path().join("smarty/cache");
        let locked = cache.join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("pinned.html"), "cached").unwrap();
        fs::write(cache.join("a.html"), "cached").unwrap();
        fs::write(cache.join("z.html"), "cached").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Permission bits do not bind a privileged user; nothing to check then.
        if fs::write(locked.join("writable"), "").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let log = RecordingLogSink::new();
        let report = invalidator(None, tmp.path(), &log).invalidate().await;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].target.ends_with("locked"));
        assert_eq!(report.removed_entries, 2);
        assert!(!cache.join("a.html").exists());
        assert!(!cache.join("z.html").exists());
        assert!(locked.join("pinned.html").exists());
        assert!(!report.cleared.iter().any(|target| target.ends_with("smarty/cache")));
    }
}
