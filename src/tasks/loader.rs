use std::collections::HashMap;
use std::num::NonZeroUsize;

use anyhow::Result;
use lru::LruCache;
use reqwest::Client;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::join_url;
use crate::error::LoadError;
use crate::events::{ImageLoaded, LoadImage};

type Decoded = Result<(u32, u32), LoadError>;

// Fetches the bytes and decodes them on the blocking pool; only the
// dimensions survive, the pixels are dropped.
async fn fetch_and_decode(client: &Client, url: &str) -> Decoded {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status(status.as_u16()));
    }
    let bytes = response.bytes().await?;
    let img = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await??;
    Ok((img.width(), img.height()))
}

// Frees the in-flight slot of a finished task, panicked or not.
fn settle(
    in_flight: &mut HashMap<Id, String>,
    joined: Result<(Id, Decoded), JoinError>,
) -> Option<(String, Decoded)> {
    match joined {
        Ok((id, res)) => in_flight.remove(&id).map(|path| (path, res)),
        Err(err) => in_flight.remove(&err.id()).map(|path| (path, Err(err.into()))),
    }
}

/// Loads slide images the way a browser would once an element is inserted:
/// - `LoadImage` paths are resolved against `server_url` and fetched.
/// - Successfully decoded images are reported as `ImageLoaded`.
/// - Failures are logged and dropped.
/// - The last `remember` decoded paths are not fetched again; older ones are evicted.
///
/// Returns once `cancel` fires, or once `load_rx` is closed and every fetch has finished.
pub async fn run(
    mut load_rx: Receiver<LoadImage>,
    loaded_tx: Sender<ImageLoaded>,
    client: Client,
    server_url: String,
    cancel: CancellationToken,
    max_in_flight: usize,
    remember: usize,
) -> Result<()> {
    let mut in_flight: HashMap<Id, String> = HashMap::new();
    let mut decoded: LruCache<String, (u32, u32)> =
        LruCache::new(NonZeroUsize::new(remember).unwrap_or(NonZeroUsize::MIN));
    let mut tasks: JoinSet<Decoded> = JoinSet::new();
    let mut open = true;

    while open || !tasks.is_empty() {
        select! {
            _ = cancel.cancelled() => break,

            msg = load_rx.recv(), if open && in_flight.len() < max_in_flight => {
                let Some(LoadImage(path)) = msg else {
                    debug!(pending = in_flight.len(), "load channel closed");
                    open = false;
                    continue;
                };
                if let Some(&(width, height)) = decoded.get(&path) {
                    debug!(path, width, height, "image already decoded");
                    continue;
                }
                if in_flight.values().any(|p| *p == path) {
                    continue;
                }
                let client = client.clone();
                let url = join_url(&server_url, &path);
                let handle = tasks.spawn(async move { fetch_and_decode(&client, &url).await });
                in_flight.insert(handle.id(), path);
            }

            Some(join_res) = tasks.join_next_with_id() => {
                let Some((path, res)) = settle(&mut in_flight, join_res) else {
                    continue;
                };
                match res {
                    Ok((width, height)) => {
                        debug!(path, width, height, "image decoded");
                        if let Some((evicted, _)) = decoded.push(path.clone(), (width, height)) {
                            debug!(path = evicted, "forgetting decoded image");
                        }
                        if loaded_tx
                            .send(ImageLoaded { url: path, width, height })
                            .await
                            .is_err()
                        {
                            debug!("nobody listening for loaded images; stopping loader");
                            break;
                        }
                    }
                    Err(err) => warn!(path, error = %err, "failed to load slide image"),
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn panicked_fetch_releases_its_slot() {
        let mut in_flight = HashMap::new();
        let mut tasks: JoinSet<Decoded> = JoinSet::new();
        let handle = tasks.spawn(async {
            let width: u32 = "wide".parse().expect("width must parse");
            Ok((width, 1))
        });
        in_flight.insert(handle.id(), "/image/a".to_string());

        let joined = tasks.join_next_with_id().await.unwrap();
        let (path, res) = settle(&mut in_flight, joined).unwrap();

        assert_eq!(path, "/image/a");
        assert!(matches!(res, Err(LoadError::Join(_))));
        assert!(in_flight.is_empty());
    }

    #[tokio::test]
    async fn unknown_task_is_ignored() {
        let mut in_flight = HashMap::new();
        let mut tasks: JoinSet<Decoded> = JoinSet::new();
        tasks.spawn(async { Ok((1, 1)) });

        let joined = tasks.join_next_with_id().await.unwrap();
        assert!(settle(&mut in_flight, joined).is_none());
    }
}
