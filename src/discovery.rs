//! Fan-out over every scanner, fan-in into one [`Catalog`].

use crate::model::{Catalog, InstallRecord, Source};
use crate::scanner::{ScanContext, Scanner};
use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Runs every scanner that [`should_run`](Scanner::should_run) and merges
/// their results.
///
/// A scanner that errors or panics is logged and contributes nothing.
/// Results are merged in source priority order regardless of the order of
/// `scanners`, so deduplication always keeps the highest-priority source.
/// If the context is cancelled, whatever was collected is returned.
pub async fn discover(scanners: &[Box<dyn Scanner>], ctx: &ScanContext) -> Catalog {
    let mut buffers: Vec<(Source, Vec<InstallRecord>)> = if ctx.config.parallel {
        join_all(scanners.iter().map(|s| run_scanner(s.as_ref(), ctx))).await
    } else {
        let mut buffers = Vec::with_capacity(scanners.len());
        for scanner in scanners {
            buffers.push(run_scanner(scanner.as_ref(), ctx).await);
        }
        buffers
    };

    buffers.sort_by_key(|(source, _)| *source);
    let records: Vec<InstallRecord> = buffers.into_iter().flat_map(|(_, r)| r).collect();

    let catalog = Catalog::from_records(records);
    tracing::info!("discovered {} games", catalog.len());
    catalog
}

/// Reruns discovery and keeps the records whose name contains `pattern`,
/// ignoring case.
pub async fn find(
    scanners: &[Box<dyn Scanner>],
    ctx: &ScanContext,
    pattern: &str,
) -> Vec<InstallRecord> {
    discover(scanners, ctx).await.matching(pattern)
}

async fn run_scanner(scanner: &dyn Scanner, ctx: &ScanContext) -> (Source, Vec<InstallRecord>) {
    let source = scanner.source();
    if !scanner.should_run(ctx) {
        tracing::debug!("skipping {} scanner", scanner.name());
        return (source, Vec::new());
    }

    let records = match AssertUnwindSafe(scanner.scan(ctx)).catch_unwind().await {
        Ok(Ok(records)) => {
            tracing::debug!("{}: {} games", scanner.name(), records.len());
            records
        }
        Ok(Err(e)) => {
            tracing::warn!("{} scan failed: {:#}", scanner.name(), e);
            Vec::new()
        }
        Err(_) => {
            tracing::warn!("{} scanner panicked", scanner.name());
            Vec::new()
        }
    };

    (source, records)
}
