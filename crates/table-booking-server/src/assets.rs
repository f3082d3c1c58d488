//! Static front end

use std::fs::File;
use std::path::{Path, PathBuf};

use tiny_http::{Response, ResponseBox};
use tracing::debug;

use crate::http::add_header;

/// Directory the browser front end is served from
///
/// Paths that do not name a file fall back to `index.html`, so that client-side
/// routes load the application.
#[derive(Clone, Debug)]
pub struct Assets {
    root: PathBuf,
}

impl Assets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a URL to the file that answers it
    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let relative = path.trim_start_matches('/');
        if relative
            .split(['/', '\\'])
            .any(|segment| segment == "..")
        {
            return None;
        }

        let index = self.root.join("index.html");
        let candidate = self.root.join(relative);
        if candidate.is_file() {
            Some(candidate)
        } else if candidate.join("index.html").is_file() {
            Some(candidate.join("index.html"))
        } else if index.is_file() {
            Some(index)
        } else {
            None
        }
    }

    /// Response to a `GET` request for a non-API path
    pub fn response(&self, url: &str) -> ResponseBox {
        let Some(path) = self.resolve(url) else {
            debug!(url, "no asset");
            return not_found().boxed();
        };

        match File::open(&path) {
            Ok(file) => {
                let mut res = Response::from_file(file);
                add_header(&mut res, "Content-Type", content_type(&path).as_ref());
                res.boxed()
            }
            Err(err) => {
                debug!(%err, path = %path.display(), "could not open asset");
                not_found().boxed()
            }
        }
    }
}

fn content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_owned()
}

fn not_found() -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string("Not Found").with_status_code(404)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn site() -> (tempfile::TempDir, Assets) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::write(dir.path().join("script.js"), "// app").unwrap();
        let assets = Assets::new(dir.path());
        (dir, assets)
    }

    #[test]
    fn serves_existing_files() {
        let (dir, assets) = site();
        assert_eq!(
            assets.resolve("/script.js?v=2"),
            Some(dir.path().join("script.js"))
        );
        assert!(content_type(Path::new("script.js")).ends_with("javascript"));
    }

    #[test]
    fn unknown_paths_fall_back_to_index() {
        let (dir, assets) = site();
        let index = dir.path().join("index.html");
        assert_eq!(assets.resolve("/"), Some(index.clone()));
        assert_eq!(assets.resolve("/reservations/42"), Some(index));
    }

    #[test]
    fn parent_segments_are_rejected() {
        let (_dir, assets) = site();
        assert_eq!(assets.resolve("/../secret.txt"), None);
        assert_eq!(assets.resolve("/a/..\\..\\secret.txt"), None);
    }

    #[test]
    fn responses_carry_status_and_content_type() {
        let (_dir, assets) = site();
        let res = assets.response("/script.js");
        assert_eq!(res.status_code(), 200);
        let content_type = res
            .headers()
            .iter()
            .find(|hdr| hdr.field.equiv("content-type"))
            .map(|hdr| hdr.value.to_string());
        assert!(content_type.unwrap().ends_with("javascript"));

        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Assets::new(dir.path()).response("/").status_code(), 404);
    }

    #[test]
    fn missing_index_means_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let assets = Assets::new(dir.path());
        assert_eq!(assets.resolve("/anything"), None);
    }
}
