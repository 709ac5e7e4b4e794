use crate::title::PageTitle;
use std::borrow::Cow;

/// A wiki page: a title and the raw bytes of its body.
///
/// Pages are only ever replaced whole; there is no partial edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: PageTitle,
    pub body: Vec<u8>,
}

impl Page {
    pub fn new(title: PageTitle, body: impl Into<Vec<u8>>) -> Self {
        Page {
            title,
            body: body.into(),
        }
    }

    /// A page that has not been written yet.
    pub fn empty(title: PageTitle) -> Self {
        Page {
            title,
            body: Vec::new(),
        }
    }

    /// The body as text. Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
