//! Page-by-page accumulation for "load more" lists.

use serde::{Deserialize, Serialize};

/// Pages fetched so far for one paginated query.
///
/// The next page index is the number of pages loaded, until a page comes
/// back empty or shorter than `page_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfiniteList<T> {
    page_size: usize,
    pages: Vec<Vec<T>>,
}

impl<T> InfiniteList<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            pages: Vec::new(),
        }
    }

    /// Start from already known items as page zero.
    pub fn with_initial(initial: Vec<T>, page_size: usize) -> Self {
        let mut list = Self::new(page_size);
        if !initial.is_empty() {
            list.pages.push(initial);
        }
        list
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Index of the page to request next, `None` when exhausted.
    pub fn next_page(&self) -> Option<usize> {
        match self.pages.last() {
            None => Some(0),
            Some(last) if last.is_empty() || last.len() < self.page_size => None,
            Some(_) => Some(self.pages.len()),
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.next_page().is_some()
    }

    pub fn push_page(&mut self, page: Vec<T>) {
        self.pages.push(page);
    }

    pub fn pages(&self) -> &[Vec<T>] {
        &self.pages
    }

    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset(&mut self) {
        self.pages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_starts_at_page_zero() {
        let list: InfiniteList<u8> = InfiniteList::new(8);
        assert_eq!(list.next_page(), Some(0));
        assert!(list.is_empty());
    }

    #[test]
    fn full_pages_advance_and_short_page_ends() {
        let mut list = InfiniteList::new(2);
        list.push_page(vec![1, 2]);
        assert_eq!(list.next_page(), Some(1));
        list.push_page(vec![3, 4]);
        assert_eq!(list.next_page(), Some(2));
        list.push_page(vec![5]);
        assert_eq!(list.next_page(), None);
        assert_eq!(list.items().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn empty_page_ends_the_list() {
        let mut list: InfiniteList<u8> = InfiniteList::new(4);
        list.push_page(vec![]);
        assert!(!list.has_next_page());
    }

    #[test]
    fn zero_page_size_stops_at_the_first_empty_page() {
        let mut list: InfiniteList<u8> = InfiniteList::new(0);
        assert_eq!(list.next_page(), Some(0));
        list.push_page(vec![]);
        assert_eq!(list.next_page(), None);
    }

    #[test]
    fn initial_items_count_as_first_page() {
        let list = InfiniteList::with_initial(vec!["a", "b"], 2);
        assert_eq!(list.next_page(), Some(1));

        let mut short = InfiniteList::with_initial(vec!["a"], 2);
        assert_eq!(short.next_page(), None);
        short.reset();
        assert_eq!(short.next_page(), Some(0));
    }
}
