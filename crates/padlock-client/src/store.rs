//! File operations guarded by a resource lock.
//!
//! Each resource maps to `<dir>/<resource>.txt`. These functions do no
//! locking of their own; callers hold the resource lock around them.

use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use padlock_proto::ResourceName;
use tracing::debug;

/// File backing `resource` inside `dir`.
pub fn resource_path(dir: &Path, resource: &ResourceName) -> PathBuf {
    dir.join(format!("{resource}.txt"))
}

/// First line of the file, or an empty string when it does not exist.
pub async fn read_value(path: &Path) -> io::Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(content.split('\n').next().unwrap_or_default().to_owned()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no value stored yet");
            Ok(String::new())
        },
        Err(error) => Err(error),
    }
}

/// Wait `delay`, then replace the file's contents with `value`.
///
/// The delay widens the critical section so contention between clients is
/// observable.
pub async fn write_value(path: &Path, value: &str, delay: Duration) -> io::Result<()> {
    tokio::time::sleep(delay).await;
    tokio::fs::write(path, value).await
}
