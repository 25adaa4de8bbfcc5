//! Sitemap XML parsing
//!
//! Recognizes the two sitemap document shapes as tagged variants: an index
//! of child sitemaps (`<sitemapindex><sitemap><loc>`) and a set of page
//! URLs (`<urlset><url><loc>`). Parsing is event-driven; documents are
//! never materialized as a DOM.

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDoc {
    /// A sitemap index; entries are child sitemap URLs to fetch
    Index(Vec<String>),

    /// A URL set; entries are page URLs
    UrlSet(Vec<String>),
}

impl SitemapDoc {
    /// Number of `<loc>` entries in the document
    pub fn len(&self) -> usize {
        match self {
            Self::Index(locs) | Self::UrlSet(locs) => locs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Errors produced while parsing a sitemap document
#[derive(Debug, Error)]
pub enum SitemapXmlError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document has no <urlset> or <sitemapindex> root")]
    NotASitemap,
}

/// Parses sitemap XML into its tagged document shape
///
/// `<loc>` text is collected in document order. Namespaced element names
/// are matched by suffix so `<ns:loc>` style documents parse the same way.
pub fn parse_sitemap_xml(xml: &[u8]) -> Result<SitemapDoc, SitemapXmlError> {
    let mut reader = Reader::from_reader(xml);

    let mut buf = Vec::new();
    let mut in_loc = false;
    let mut locs: Vec<String> = Vec::new();

    let mut saw_urlset = false;
    let mut saw_index = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.name();
                let name = name.as_ref();
                if name.ends_with(b"urlset") {
                    saw_urlset = true;
                } else if name.ends_with(b"sitemapindex") {
                    saw_index = true;
                } else if name.ends_with(b"loc") {
                    in_loc = true;
                }
            }
            Event::End(e) => {
                if e.name().as_ref().ends_with(b"loc") {
                    in_loc = false;
                }
            }
            Event::Text(t) => {
                if in_loc {
                    // An unescapable entity just drops the entry.
                    if let Ok(text) = t.unescape() {
                        let text = text.trim().to_string();
                        if !text.is_empty() {
                            locs.push(text);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if saw_index && !saw_urlset {
        Ok(SitemapDoc::Index(locs))
    } else if saw_urlset {
        Ok(SitemapDoc::UrlSet(locs))
    } else {
        Err(SitemapXmlError::NotASitemap)
    }
}
