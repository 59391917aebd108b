//! Curated educational websites, linked through their own search pages.

use super::render::escape_html;
use std::fmt::Write;

/// An educational platform with a search URL that takes the query as a suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EducationalSite {
    /// Display name
    pub name: &'static str,
    /// Search URL prefix; the URL-encoded query is appended
    pub search_url: &'static str,
}

/// Known platforms, in display order
pub const EDUCATIONAL_SITES: [EducationalSite; 10] = [
    EducationalSite {
        name: "Khan Academy",
        search_url: "https://www.khanacademy.org/search?page_search_query=",
    },
    EducationalSite {
        name: "Coursera",
        search_url: "https://www.coursera.org/search?query=",
    },
    EducationalSite {
        name: "edX",
        search_url: "https://www.edx.org/search?q=",
    },
    EducationalSite {
        name: "MIT OpenCourseWare",
        search_url: "https://ocw.mit.edu/search/?q=",
    },
    EducationalSite {
        name: "BBC Bitesize",
        search_url: "https://www.bbc.co.uk/bitesize/search?q=",
    },
    EducationalSite {
        name: "National Geographic Education",
        search_url: "https://education.nationalgeographic.org/resource/?q=",
    },
    EducationalSite {
        name: "TED-Ed",
        search_url: "https://ed.ted.com/search?qs=",
    },
    EducationalSite {
        name: "Smithsonian Learning Lab",
        search_url: "https://learninglab.si.edu/search?st=",
    },
    EducationalSite {
        name: "PhET Interactive Simulations",
        search_url: "https://phet.colorado.edu/en/simulations/filter?sort=alpha&view=grid&q=",
    },
    EducationalSite {
        name: "CK-12 Foundation",
        search_url: "https://www.ck12.org/search/?q=",
    },
];

/// Number of sites linked per stage
pub const SITES_PER_STAGE: usize = 5;

/// `<ul>` of search links for `topic grade stage` on the first few sites
pub(crate) fn link_list(topic: &str, grade: &str, stage: &str) -> String {
    let query = urlencoding::encode(&format!("{topic} {grade} {stage}")).into_owned();
    let mut html = String::from("<ul>");
    for site in EDUCATIONAL_SITES.iter().take(SITES_PER_STAGE) {
        let _ = write!(
            html,
            "<li><a href=\"{}\" target=\"_blank\">{}</a></li>",
            escape_html(&format!("{}{query}", site.search_url)),
            site.name
        );
    }
    html.push_str("</ul>");
    html
}
