//! Bounded iterator

/// Iterator adapter that stops after `max` items, whatever the source holds
///
/// Unlike `Take`, the cap is optional and the source is never polled once
/// the cap is reached.
pub struct Bounded<I> {
    inner: I,
    remaining: Option<usize>,
}

impl<I: Iterator> Bounded<I> {
    /// `None` leaves the source unbounded
    pub fn new(inner: I, max: Option<usize>) -> Self {
        Self {
            inner,
            remaining: max,
        }
    }

    /// True once the cap has been reached
    pub fn is_capped(&self) -> bool {
        self.remaining == Some(0)
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: Iterator> Iterator for Bounded<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.remaining {
            Some(0) => None,
            Some(ref mut n) => {
                let item = self.inner.next()?;
                *n -= 1;
                Some(item)
            }
            None => self.inner.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stops_at_cap() {
        let mut polled = 0;
        let source = std::iter::from_fn(|| {
            polled += 1;
            Some(polled)
        });
        let items: Vec<_> = Bounded::new(source, Some(3)).collect();
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(polled, 3);
    }

    #[test]
    fn test_short_source_and_unbounded() {
        let mut bounded = Bounded::new(vec![1, 2].into_iter(), Some(5));
        assert_eq!(bounded.by_ref().count(), 2);
        assert!(!bounded.is_capped());
        assert_eq!(Bounded::new(0..4, None).count(), 4);
        assert_eq!(Bounded::new(0..4, Some(0)).count(), 0);
    }
}
