//! Durable page storage: one `<title>.txt` file per page under a single content root.
//!
//! The store keeps no in-memory state besides the root path. Every [`PageStore::load`] is a
//! fresh read, and every [`PageStore::save`] replaces the whole file, so the filesystem is the
//! only source of truth. Concurrent saves of the same title race; the last rename wins.

use crate::{error::WikiError, page::Page, title::PageTitle};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

/// File extension for stored page bodies.
pub const PAGE_EXTENSION: &str = "txt";

#[derive(Debug, Clone)]
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    /// Open a store rooted at `root`, creating the directory (owner-only) if it is absent.
    ///
    /// Fails if `root` exists but is not a directory, or if it cannot be created. Callers at
    /// process startup are expected to treat an error here as fatal.
    pub fn ensure_root<P: Into<PathBuf>>(root: P) -> Result<PageStore, WikiError> {
        let root = root.into();
        match fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => {
                tracing::debug!("Using existing content root {:?}", root);
            }
            Ok(_) => {
                return Err(WikiError::Io(format!(
                    "'{}' path exists, but is not a directory",
                    root.display()
                )));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!("creating data directory {:?}", root);
                create_owner_only_dir(&root).map_err(|err| {
                    WikiError::Io(format!(
                        "unable to create data directory '{}': {err}",
                        root.display()
                    ))
                })?;
            }
            Err(err) => {
                return Err(WikiError::Io(format!(
                    "unable to inspect data directory '{}': {err}",
                    root.display()
                )));
            }
        }
        Ok(PageStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the file backing `title`.
    ///
    /// The title is re-validated here regardless of what the caller already checked, so no
    /// string can address a path outside the root.
    pub fn path_for(&self, title: impl AsRef<str>) -> Result<PathBuf, WikiError> {
        let title: PageTitle = title.as_ref().parse()?;
        Ok(self.root.join(format!("{title}.{PAGE_EXTENSION}")))
    }

    pub fn load(&self, title: impl AsRef<str>) -> Result<Page, WikiError> {
        let title: PageTitle = title.as_ref().parse()?;
        let path = self.path_for(&title)?;
        match fs::read(&path) {
            Ok(body) => Ok(Page::new(title, body)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(WikiError::NotFound(format!("page '{title}'")))
            }
            Err(err) => Err(WikiError::Io(format!(
                "unable to read '{}': {err}",
                path.display()
            ))),
        }
    }

    pub fn exists(&self, title: impl AsRef<str>) -> Result<bool, WikiError> {
        Ok(self.path_for(title)?.is_file())
    }

    /// Replace the stored body of `page.title` with `page.body`.
    ///
    /// The body is written to a temporary file inside the root and renamed into place, so a
    /// concurrent `load` sees either the old body or the new one, never a prefix.
    pub fn save(&self, page: &Page) -> Result<(), WikiError> {
        let path = self.path_for(&page.title)?;
        tracing::info!("saving page '{}' as file {:?}", page.title, path);
        let mut tmp = tempfile::Builder::new()
            .prefix(".save-")
            .suffix(".tmp")
            .tempfile_in(&self.root)
            .map_err(write_failure(&path))?;
        tmp.write_all(&page.body).map_err(write_failure(&path))?;
        tmp.as_file().sync_all().map_err(write_failure(&path))?;
        tmp.persist(&path)
            .map_err(|err| write_failure(&path)(err.error))?;
        Ok(())
    }

    /// Titles of every stored page, sorted.
    ///
    /// Files whose stem is not a valid title (temporary files, stray notes) are skipped.
    pub fn titles(&self) -> Result<Vec<PageTitle>, WikiError> {
        let mut titles = Vec::new();
        let listing_failure = |err: io::Error| {
            WikiError::Io(format!("unable to list '{}': {err}", self.root.display()))
        };
        for entry in fs::read_dir(&self.root).map_err(listing_failure)? {
            let path = entry.map_err(listing_failure)?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(PAGE_EXTENSION) {
                continue;
            }
            if let Some(title) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<PageTitle>().ok())
            {
                if path.is_file() {
                    titles.push(title);
                }
            }
        }
        titles.sort();
        Ok(titles)
    }
}

/// Write failures are always `Io`, including `NotFound` from a vanished content root.
fn write_failure(path: &Path) -> impl Fn(io::Error) -> WikiError + '_ {
    move |err| WikiError::Io(format!("unable to write '{}': {err}", path.display()))
}

#[cfg(unix)]
fn create_owner_only_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(path)
}

#[cfg(not(unix))]
fn create_owner_only_dir(path: &Path) -> io::Result<()> {
    fs::DirBuilder::new().recursive(true).create(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_log::test;

    fn title(s: &str) -> PageTitle {
        s.parse().unwrap()
    }

    #[test]
    fn test_ensure_root_creates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("data");
        let store = PageStore::ensure_root(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root.as_path());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&root).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }

    #[test]
    fn test_ensure_root_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("data");
        PageStore::ensure_root(&root).unwrap();
        fs::write(root.join("Keep.txt"), "kept").unwrap();
        let store = PageStore::ensure_root(&root).unwrap();
        assert_eq!(store.load("Keep").unwrap().body, b"kept");
    }

    #[test]
    fn test_ensure_root_rejects_regular_file() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("data");
        fs::write(&root, "not a dir").unwrap();
        let result = PageStore::ensure_root(&root);
        assert!(matches!(result, Err(WikiError::Io(_))), "{result:?}");
    }

    #[test]
    fn test_ensure_root_reports_creation_failure() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "parent is not a directory").unwrap();
        let result = PageStore::ensure_root(blocker.join("data"));
        assert!(matches!(result, Err(WikiError::Io(_))), "{result:?}");
    }

    #[test]
    fn test_load_unreadable_page_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let store = PageStore::ensure_root(tmp.path()).unwrap();
        fs::create_dir(tmp.path().join("Shadowed.txt")).unwrap();
        let err = store.load("Shadowed").unwrap_err();
        assert!(matches!(err, WikiError::Io(_)), "{err:?}");
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_vanished_root_is_io_error_not_missing_page() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("data");
        let store = PageStore::ensure_root(&root).unwrap();
        fs::remove_dir(&root).unwrap();

        let err = store.save(&Page::new(title("Page"), "body")).unwrap_err();
        assert!(matches!(err, WikiError::Io(_)), "{err:?}");
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);

        let err = store.titles().unwrap_err();
        assert!(matches!(err, WikiError::Io(_)), "{err:?}");
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);

        // A missing page in a missing root is still just a missing page.
        assert!(store.load("Page").unwrap_err().is_not_found());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = PageStore::ensure_root(tmp.path()).unwrap();

        let bodies: [&[u8]; 4] = [
            b"",
            b"hello [World]",
            b"no trailing newline",
            b"\xff\xfe binary \x00 bytes\n\n",
        ];
        for body in bodies {
            let page = Page::new(title("RoundTrip"), body);
            store.save(&page).unwrap();
            assert_eq!(store.load("RoundTrip").unwrap(), page);
        }
    }

    #[test]
    fn test_save_writes_title_txt_owner_only() {
        let tmp = TempDir::new().unwrap();
        let store = PageStore::ensure_root(tmp.path()).unwrap();
        store
            .save(&Page::new(title("FrontPage"), "welcome"))
            .unwrap();

        let path = tmp.path().join("FrontPage.txt");
        assert_eq!(fs::read_to_string(&path).unwrap(), "welcome");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_save_overwrites_and_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let store = PageStore::ensure_root(tmp.path()).unwrap();
        store
            .save(&Page::new(title("Page"), "a much longer first body"))
            .unwrap();
        store.save(&Page::new(title("Page"), "short")).unwrap();

        assert_eq!(store.load("Page").unwrap().body, b"short");
        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("Page.txt")]);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = PageStore::ensure_root(tmp.path()).unwrap();
        let err = store.load("NeverSaved").unwrap_err();
        assert!(err.is_not_found(), "{err:?}");
        assert!(!store.exists("NeverSaved").unwrap());
    }

    #[test]
    fn test_path_traversal_is_contained() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("data");
        let store = PageStore::ensure_root(&root).unwrap();
        fs::write(tmp.path().join("secret.txt"), "outside").unwrap();

        for hostile in ["../secret", "..", "/etc/passwd", "a/../../secret", "sub\\x"] {
            assert!(matches!(
                store.load(hostile),
                Err(WikiError::InvalidTitle(_))
            ));
            assert!(matches!(
                store.path_for(hostile),
                Err(WikiError::InvalidTitle(_))
            ));
        }
        assert_eq!(fs::read_to_string(tmp.path().join("secret.txt")).unwrap(), "outside");
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn test_titles_lists_valid_pages_sorted() {
        let tmp = TempDir::new().unwrap();
        let store = PageStore::ensure_root(tmp.path()).unwrap();
        store.save(&Page::new(title("Zeta"), "z")).unwrap();
        store.save(&Page::new(title("Alpha"), "a")).unwrap();
        fs::write(tmp.path().join("not-a-title.txt"), "skip").unwrap();
        fs::write(tmp.path().join("Notes.md"), "skip").unwrap();
        fs::create_dir(tmp.path().join("Dir.txt")).unwrap();

        assert_eq!(store.titles().unwrap(), vec![title("Alpha"), title("Zeta")]);
    }
}
