/// Dashboard pages reachable from the nav
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Reports,
    TimeManagement,
    WebsiteBlocking,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Overview, Page::Reports, Page::TimeManagement, Page::WebsiteBlocking];

    pub fn title(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Reports => "Reports",
            Page::TimeManagement => "Time Management",
            Page::WebsiteBlocking => "Website Blocking",
        }
    }

    pub fn hash(self) -> &'static str {
        match self {
            Page::Overview => "#overview",
            Page::Reports => "#reports",
            Page::TimeManagement => "#time",
            Page::WebsiteBlocking => "#blocking",
        }
    }

    /// Page for a location hash; anything unknown lands on the overview
    pub fn from_hash(hash: &str) -> Self {
        Page::ALL
            .into_iter()
            .find(|page| page.hash() == hash)
            .unwrap_or(Page::Overview)
    }

    /// Page named in the current URL
    pub fn current() -> Self {
        web_sys::window()
            .and_then(|window| window.location().hash().ok())
            .map(|hash| Page::from_hash(&hash))
            .unwrap_or(Page::Overview)
    }

    /// Record the page in the URL so a reload comes back to it
    pub fn push(self) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_hash(self.hash()) {
                log::warn!("Could not update location hash: {:?}", e);
            }
        }
    }
}
