//! Lookahead iterator

use std::iter::Peekable;

/// Iterator adapter that can inspect the next item without consuming it
pub struct Lookahead<I: Iterator> {
    inner: Peekable<I>,
}

impl<I: Iterator> Lookahead<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner: inner.peekable(),
        }
    }

    /// The next item, left in place
    pub fn peek(&mut self) -> Option<&I::Item> {
        self.inner.peek()
    }

    pub fn has_next(&mut self) -> bool {
        self.inner.peek().is_some()
    }
}

impl<I: Iterator> Iterator for Lookahead<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_consume() {
        let mut it = Lookahead::new(vec![1, 2].into_iter());
        assert_eq!(it.peek(), Some(&1));
        assert_eq!(it.peek(), Some(&1));
        assert!(it.has_next());
        assert_eq!(it.next(), Some(1));
        assert_eq!(it.next(), Some(2));
        assert!(!it.has_next());
        assert_eq!(it.peek(), None);
    }
}
