//! Population pipeline.
//!
//! `EnsurePartitions -> FetchAll -> ParseAndLoadAll`. Each of the two bulk
//! stages runs one task per source and waits for all of them before the
//! next stage starts; the first failure ends the run once its siblings
//! have finished.

use crate::errors::{Error, Result, Stage};
use crate::options::Options;
use crate::store::SubnetStore;
use crate::telemetry::{DOWNLOADS, RECORDS_SKIPPED, UPSERTS};
use crate::types::{DelegationRecord, FileStats, IpFamily, PopulateReport};
use log::{debug, info, trace, warn};
use metrics::counter;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;

/// Local file name for a source URL: the last segment of its path.
pub fn local_file_name(url: &str) -> Result<String> {
    let parsed = reqwest::Url::parse(url).map_err(|_| Error::InvalidUrl(url.to_owned()))?;
    parsed
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::InvalidUrl(url.to_owned()))
}

pub(crate) async fn populate(store: &Arc<SubnetStore>, opts: &Options) -> Result<PopulateReport> {
    ensure_partitions(store)
        .await
        .map_err(|e| e.at(Stage::EnsurePartitions))?;

    let targets = opts
        .sources
        .iter()
        .map(|url| Ok((url.clone(), opts.data_dir.join(local_file_name(url)?))))
        .collect::<Result<Vec<(String, PathBuf)>>>()
        .map_err(|e| e.at(Stage::Fetch))?;

    fetch_all(opts, &targets)
        .await
        .map_err(|e| e.at(Stage::Fetch))?;

    let paths: Vec<PathBuf> = targets.into_iter().map(|(_, path)| path).collect();
    let report = load_all(store, paths)
        .await
        .map_err(|e| e.at(Stage::ParseAndLoad))?;

    info!(
        "population done: files={}, loaded={}, skipped={}",
        report.files, report.loaded, report.skipped
    );
    Ok(report)
}

async fn ensure_partitions(store: &Arc<SubnetStore>) -> Result<()> {
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || {
        IpFamily::ALL
            .into_iter()
            .try_for_each(|family| store.ensure_partition(family))
    })
    .await?
}

async fn fetch_all(opts: &Options, targets: &[(String, PathBuf)]) -> Result<()> {
    let mut set = JoinSet::new();
    for (url, path) in targets {
        if !opts.download_rir_files {
            debug!("download disabled, reusing {}", path.display());
            continue;
        }
        info!("downloading {url}");
        set.spawn(fetch(opts.http_client.clone(), url.clone(), path.clone()));
    }
    join_all(set).await.map(|_| ())
}

async fn fetch(client: reqwest::Client, url: String, path: PathBuf) -> Result<()> {
    let mut rsp = client
        .get(&url)
        .send()
        .await
        .map_err(|source| Error::Fetch { url: url.clone(), source })?;
    let status = rsp.status();
    if !status.is_success() {
        return Err(Error::Status { url, status });
    }

    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| Error::io(&path, e))?;
    while let Some(chunk) = rsp
        .chunk()
        .await
        .map_err(|source| Error::Fetch { url: url.clone(), source })?
    {
        file.write_all(&chunk).await.map_err(|e| Error::io(&path, e))?;
    }
    file.flush().await.map_err(|e| Error::io(&path, e))?;

    counter!(DOWNLOADS).increment(1);
    debug!("saved {url} to {}", path.display());
    Ok(())
}

async fn load_all(store: &Arc<SubnetStore>, paths: Vec<PathBuf>) -> Result<PopulateReport> {
    let mut set = JoinSet::new();
    for path in paths {
        let store = Arc::clone(store);
        set.spawn_blocking(move || load_file(&store, &path));
    }
    let per_file = join_all(set).await?;

    // Flush the eventual commits of every loader in one go.
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || store.sync()).await??;

    let mut report = PopulateReport::default();
    per_file.into_iter().for_each(|stats| report.absorb(stats));
    Ok(report)
}

/// Scan one delegation file and upsert every usable record.
///
/// Unusable lines are skipped; read and store errors abort the file.
pub(crate) fn load_file(store: &SubnetStore, path: &Path) -> Result<FileStats> {
    info!("processing {}", path.display());
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = BufReader::new(file);
    let mut stats = FileStats::default();

    for raw in reader.split(b'\n') {
        let raw = raw.map_err(|e| Error::io(path, e))?;
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_end_matches('\r');

        let entry = DelegationRecord::parse(line)
            .and_then(|rec| rec.subnet_key().map(|key| (rec, key)));
        match entry {
            Some((rec, key)) => {
                store.upsert(rec.family, &key, &rec.country)?;
                counter!(UPSERTS).increment(1);
                stats.loaded += 1;
            }
            None => {
                trace!("skipping {line:?}");
                counter!(RECORDS_SKIPPED).increment(1);
                stats.skipped += 1;
            }
        }
    }

    info!(
        "{}: loaded={}, skipped={}",
        path.display(),
        stats.loaded,
        stats.skipped
    );
    Ok(stats)
}

/// Wait for every task in `set`; return all results, or the first error.
///
/// Tasks are never aborted: a failure only decides the aggregate result.
async fn join_all<T: Send + 'static>(mut set: JoinSet<Result<T>>) -> Result<Vec<T>> {
    let mut done = Vec::with_capacity(set.len());
    let mut first_err = None;
    while let Some(joined) = set.join_next().await {
        match joined.map_err(Error::from).and_then(|r| r) {
            Ok(v) => done.push(v),
            Err(e) if first_err.is_none() => first_err = Some(e),
            Err(e) => warn!("additional task failure: {e}"),
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(done),
    }
}
