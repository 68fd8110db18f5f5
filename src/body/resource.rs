//! File-backed resources served as response bodies.

use crate::error::HttpError;
use crate::stream::{Source, Stream};
use bytes::Bytes;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path, PathBuf};

const CHUNK_SIZE: usize = 64 * 1024;

/// A file resource. Existence, size and media type are probed lazily; the
/// content is streamed in chunks when the body is assembled.
#[derive(Debug, Clone)]
pub struct Resource {
    path: PathBuf,
}

/// Probed resource metadata stamped on the response when not already set.
#[derive(Debug, Clone, Copy)]
pub struct ResourceMeta {
    pub size: u64,
    pub media_type: &'static str,
}

impl Resource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Resource { path: path.into() }
    }

    /// Resolve a URL path under a base directory, rejecting anything that
    /// would traverse outside of it.
    pub fn under(base: impl Into<PathBuf>, url_path: &str) -> Option<Self> {
        let mut resolved = base.into();
        for component in Path::new(url_path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(segment) => resolved.push(segment),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(Resource { path: resolved })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn size(&self) -> Option<u64> {
        fs::metadata(&self.path).ok().map(|meta| meta.len())
    }

    /// Media type guessed from the file extension.
    pub fn media_type(&self) -> &'static str {
        match self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "html" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "json" => "application/json",
            "txt" => "text/plain",
            "xml" => "application/xml",
            "ico" => "image/x-icon",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "svg" => "image/svg+xml",
            "woff2" => "font/woff2",
            _ => "application/octet-stream",
        }
    }

    /// Open the resource for streaming. A missing file is a 404, any other
    /// open failure a 500.
    pub(crate) fn open(self) -> Result<(ResourceMeta, Stream<Bytes>), HttpError> {
        let metadata = fs::metadata(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HttpError::NotFound(self.path.display().to_string())
            } else {
                HttpError::Internal(format!("failed to stat {}: {e}", self.path.display()))
            }
        })?;
        if !metadata.is_file() {
            return Err(HttpError::Internal(format!(
                "not a regular file: {}",
                self.path.display()
            )));
        }
        let media_type = self.media_type();
        let file = File::open(&self.path).map_err(|e| {
            HttpError::Internal(format!("failed to open {}: {e}", self.path.display()))
        })?;

        struct FileSource {
            file: Option<File>,
        }
        impl Source<Bytes> for FileSource {
            fn pull(&mut self) -> Option<Bytes> {
                let file = self.file.as_mut()?;
                let mut buf = vec![0u8; CHUNK_SIZE];
                match file.read(&mut buf) {
                    Ok(0) | Err(_) => {
                        // a read failure truncates the stream; the framing
                        // contract reports it as a content length mismatch
                        self.file = None;
                        None
                    }
                    Ok(read) => {
                        buf.truncate(read);
                        Some(Bytes::from(buf))
                    }
                }
            }
            fn cancel(&mut self) {
                self.file = None;
            }
        }

        Ok((
            ResourceMeta {
                size: metadata.len(),
                media_type,
            },
            Stream::from_source(FileSource { file: Some(file) }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_under_rejects_traversal() {
        assert!(Resource::under("/srv/static", "../etc/passwd").is_none());
        assert!(Resource::under("/srv/static", "a/../../etc").is_none());
        let ok = Resource::under("/srv/static", "/css/site.css").unwrap();
        assert_eq!(ok.path(), Path::new("/srv/static/css/site.css"));
    }

    #[test]
    fn test_media_type_probe() {
        assert_eq!(Resource::new("favicon.ico").media_type(), "image/x-icon");
        assert_eq!(Resource::new("site.CSS").media_type(), "text/css");
        assert_eq!(Resource::new("blob").media_type(), "application/octet-stream");
    }

    #[test]
    fn test_open_streams_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"resource bytes").unwrap();
        let (meta, stream) = Resource::new(file.path()).open().unwrap();
        assert_eq!(meta.size, 14);
        let content: Vec<u8> = stream.fold(Vec::new(), |mut acc, chunk| {
            acc.extend_from_slice(&chunk);
            acc
        });
        assert_eq!(content, b"resource bytes");
    }

    #[test]
    fn test_open_missing_is_not_found() {
        let err = Resource::new("/definitely/not/here.txt").open().unwrap_err();
        assert!(matches!(err, HttpError::NotFound(_)));
    }

    #[test]
    fn test_open_directory_is_internal() {
        let dir = tempfile::tempdir().unwrap();
        let err = Resource::new(dir.path()).open().unwrap_err();
        assert!(matches!(err, HttpError::Internal(_)));
    }
}
