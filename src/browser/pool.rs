use chromiumoxide::page::Page;

/// The tabs the coordinator can route to, plus which one is active.
#[derive(Default)]
pub struct TabPool {
    pages: Vec<Page>,
    active_index: Option<usize>,
}

impl TabPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.active_index.and_then(|i| self.pages.get(i))
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
        self.active_index = Some(self.pages.len() - 1);
    }

    pub fn select_by_target_id(&mut self, target_id: &str) -> Option<&Page> {
        let pos = self
            .pages
            .iter()
            .position(|p| p.target_id().as_ref() == target_id)?;
        self.active_index = Some(pos);
        self.pages.get(pos)
    }

    pub fn remove_page(&mut self, target_id: &str) -> bool {
        let Some(pos) = self
            .pages
            .iter()
            .position(|p| p.target_id().as_ref() == target_id)
        else {
            return false;
        };
        self.pages.remove(pos);
        self.active_index = match self.active_index {
            _ if self.pages.is_empty() => None,
            Some(i) if i >= self.pages.len() => Some(self.pages.len() - 1),
            other => other,
        };
        true
    }

    pub fn clear(&mut self) {
        self.pages.clear();
        self.active_index = None;
    }

    pub fn list_pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pool_has_no_active_page() {
        let mut pool = TabPool::new();
        assert!(pool.active_page().is_none());
        assert_eq!(pool.page_count(), 0);
        assert!(!pool.remove_page("missing"));
        assert!(pool.select_by_target_id("missing").is_none());
    }
}
