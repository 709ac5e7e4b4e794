use crate::{
    error::WikiError,
    links::LinkRenderer,
    page::Page,
    template::{Templates, EDIT_TEMPLATE, INDEX_TEMPLATE, VIEW_TEMPLATE},
    title::PageTitle,
};

/// Title shown on the page listing.
pub const INDEX_TITLE: &str = "Index";

/// Turns pages into HTML.
///
/// The edit view is the escaped template output only. The read view and the page index are
/// escaped first and then passed through the [`LinkRenderer`], so the only live markup that
/// can come out of a page body is the link markup the renderer itself writes.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    templates: Templates,
    links: LinkRenderer,
}

impl PageRenderer {
    pub fn new(templates: Templates, links: LinkRenderer) -> Self {
        PageRenderer { templates, links }
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn links(&self) -> &LinkRenderer {
        &self.links
    }

    pub fn edit(&self, page: &Page) -> Result<String, WikiError> {
        self.templates.render(EDIT_TEMPLATE, page)
    }

    pub fn view(&self, page: &Page) -> Result<String, WikiError> {
        self.render_with_links(VIEW_TEMPLATE, page)
    }

    /// A listing of `titles`, each as a link to its page.
    pub fn index(&self, titles: &[PageTitle]) -> Result<String, WikiError> {
        let body = titles
            .iter()
            .map(|title| format!("[{title}]"))
            .collect::<Vec<_>>()
            .join("\n");
        let page = Page::new(INDEX_TITLE.parse()?, body);
        self.render_with_links(INDEX_TEMPLATE, &page)
    }

    fn render_with_links(&self, name: &str, page: &Page) -> Result<String, WikiError> {
        let html = self.templates.render(name, page)?;
        Ok(self.links.render(&html).into_owned())
    }
}
