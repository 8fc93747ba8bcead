//! 1-based page cursor clamped to the current document

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNavigator {
    page: u32,
    page_count: u32,
}

impl Default for PageNavigator {
    fn default() -> Self {
        Self { page: 1, page_count: 1 }
    }
}

impl PageNavigator {
    /// A count of zero is treated as a single-page document
    pub fn new(page_count: u32) -> Self {
        Self { page: 1, page_count: page_count.max(1) }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Move by a signed delta, clamping into `[1, page_count]`. Returns the new page.
    pub fn go_to(&mut self, delta: i64) -> u32 {
        let target = i64::from(self.page).saturating_add(delta);
        self.page = target.clamp(1, i64::from(self.page_count)) as u32;
        self.page
    }

    pub fn next(&mut self) -> u32 {
        self.go_to(1)
    }

    pub fn prev(&mut self) -> u32 {
        self.go_to(-1)
    }

    /// Jump to an absolute page, clamped
    pub fn set_page(&mut self, page: u32) -> u32 {
        self.page = page.max(1).min(self.page_count);
        self.page
    }

    /// Reset to page 1 for a newly loaded document
    pub fn on_document_changed(&mut self, page_count: u32) {
        self.page_count = page_count.max(1);
        self.page = 1;
    }

    pub fn can_go_prev(&self) -> bool {
        self.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.page < self.page_count
    }

    pub fn label(&self) -> String {
        format!("Page {} / {}", self.page, self.page_count)
    }
}
