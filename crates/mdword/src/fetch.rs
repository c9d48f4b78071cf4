//! Retrieval of remote images.

use std::path::PathBuf;

use crate::Result;

/// Downloads remote images into local files.
pub trait ImageFetcher {
    /// Retrieves the image at `url`, returning the local file holding it.
    fn fetch(&mut self, url: &str) -> Result<PathBuf>;
}

/// Whether an image source refers to a remote resource.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Derives a local file name from the path component of a URL.
pub fn file_name_of(url: &str, fallback_index: usize) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let name = path
        .split_once('/')
        .map_or("", |(_, path)| path.rsplit('/').next().unwrap_or_default());

    if name.contains('.') && !name.starts_with('.') {
        name.to_owned()
    } else {
        format!("image_{fallback_index}.img")
    }
}

/// The fetcher used when none is injected.
pub fn default_fetcher() -> Box<dyn ImageFetcher> {
    #[cfg(feature = "remote")]
    {
        Box::new(HttpFetcher::new())
    }
    #[cfg(not(feature = "remote"))]
    {
        Box::new(OfflineFetcher)
    }
}

/// A fetcher refusing every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFetcher;

impl ImageFetcher for OfflineFetcher {
    fn fetch(&mut self, url: &str) -> Result<PathBuf> {
        Err(format!("remote images are disabled, cannot fetch {url}").into())
    }
}

#[cfg(feature = "remote")]
pub use http::HttpFetcher;

#[cfg(feature = "remote")]
mod http {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use log::info;
    use tempfile::TempDir;

    use super::{ImageFetcher, file_name_of};
    use crate::{Error, Result};

    /// Downloads images over HTTP(S) into a temporary directory that lives as
    /// long as the fetcher.
    pub struct HttpFetcher {
        timeout: Duration,
        dir: Option<TempDir>,
        downloads: usize,
    }

    impl Default for HttpFetcher {
        fn default() -> Self {
            Self::new()
        }
    }

    impl HttpFetcher {
        pub fn new() -> Self {
            Self {
                timeout: Duration::from_secs(10),
                dir: None,
                downloads: 0,
            }
        }

        /// Sets the timeout of a single download.
        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }

        fn temp_dir(&mut self) -> Result<&Path> {
            if self.dir.is_none() {
                self.dir = Some(tempfile::Builder::new().prefix("mdword-").tempdir()?);
            }
            match &self.dir {
                Some(dir) => Ok(dir.path()),
                None => Err("cannot create a temporary directory".into()),
            }
        }
    }

    impl ImageFetcher for HttpFetcher {
        fn fetch(&mut self, url: &str) -> Result<PathBuf> {
            info!("downloading remote image {url}");

            let timeout = self.timeout;
            let data = threaded_http(url, timeout)
                .ok_or_else(|| Error::msg("cannot spawn http thread"))?
                .map_err(|err| err.context(url))?;

            self.downloads += 1;
            let index = self.downloads;
            let dir = self.temp_dir()?;
            let mut path = dir.join(file_name_of(url, index));
            if path.exists() {
                path = dir.join(format!("{index}-{}", file_name_of(url, index)));
            }

            std::fs::write(&path, &data)?;
            Ok(path)
        }
    }

    /// Runs a blocking request off the calling thread, which may belong to an
    /// async runtime.
    fn threaded_http(url: &str, timeout: Duration) -> Option<Result<Vec<u8>>> {
        std::thread::scope(|s| {
            s.spawn(move || -> Result<Vec<u8>> {
                let client = reqwest::blocking::Client::builder()
                    .timeout(timeout)
                    .build()?;
                let response = client.get(url).send()?.error_for_status()?;
                Ok(response.bytes()?.to_vec())
            })
            .join()
            .ok()
        })
    }
}
