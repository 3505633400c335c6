//! Lazy iteration helpers: `range`, `enumerate`, `zip` and `count`.
//!
//! Every adapter is a plain [`Iterator`]: finite unless documented
//! otherwise, consumed once, never restartable.

use crate::error::{Result, SupportError};

/// Lazy arithmetic progression produced by `range(start, stop, step)`.
#[derive(Debug, Clone)]
pub struct Range {
    next: i64,
    stop: i64,
    step: i64,
}

/// `range(start, stop, step)`. A zero step is a `ValueError`.
pub fn range(start: i64, stop: i64, step: i64) -> Result<Range> {
    if step == 0 {
        return Err(SupportError::Value("range() arg 3 must not be zero".into()));
    }
    Ok(Range {
        next: start,
        stop,
        step,
    })
}

/// `range(stop)`.
pub fn range_to(stop: i64) -> Range {
    Range {
        next: 0,
        stop,
        step: 1,
    }
}

impl Iterator for Range {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let more = if self.step > 0 {
            self.next < self.stop
        } else {
            self.next > self.stop
        };
        if !more {
            return None;
        }
        let current = self.next;
        match current.checked_add(self.step) {
            Some(next) => self.next = next,
            None => self.next = self.stop,
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let span = if self.step > 0 {
            self.stop.saturating_sub(self.next)
        } else {
            self.next.saturating_sub(self.stop)
        };
        if span <= 0 {
            return (0, Some(0));
        }
        let step = self.step.unsigned_abs();
        let count = (span.unsigned_abs()).div_ceil(step);
        let count = usize::try_from(count).unwrap_or(usize::MAX);
        (count, Some(count))
    }
}

/// Pairs produced by `enumerate(iterable, start)`.
#[derive(Debug, Clone)]
pub struct Enumerate<I> {
    inner: I,
    index: i64,
}

pub fn enumerate<I: IntoIterator>(iterable: I, start: i64) -> Enumerate<I::IntoIter> {
    Enumerate {
        inner: iterable.into_iter(),
        index: start,
    }
}

impl<I: Iterator> Iterator for Enumerate<I> {
    type Item = (i64, I::Item);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        let index = self.index;
        self.index = self.index.saturating_add(1);
        Some((index, item))
    }
}

/// Tuples produced by `zip(*iterables)`; stops at the shortest input.
#[derive(Debug, Clone)]
pub struct Zip<I> {
    inputs: Vec<I>,
}

pub fn zip<I: IntoIterator>(iterables: impl IntoIterator<Item = I>) -> Zip<I::IntoIter> {
    Zip {
        inputs: iterables.into_iter().map(IntoIterator::into_iter).collect(),
    }
}

impl<I: Iterator> Iterator for Zip<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.inputs.is_empty() {
            return None;
        }
        let mut row = Vec::with_capacity(self.inputs.len());
        for input in &mut self.inputs {
            row.push(input.next()?);
        }
        Some(row)
    }
}

/// `itertools.count(start, step)`. Unbounded; callers must stop it.
#[derive(Debug, Clone)]
pub struct Count {
    next: i64,
    step: i64,
}

pub fn count(start: i64, step: i64) -> Count {
    Count { next: start, step }
}

impl Iterator for Count {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let current = self.next;
        self.next = current.checked_add(self.step)?;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_positive_and_negative_steps() {
        assert_eq!(range_to(4).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(range(10, 0, -3).unwrap().collect::<Vec<_>>(), vec![10, 7, 4, 1]);
        assert_eq!(range(0, 5, -1).unwrap().count(), 0);
    }

    #[test]
    fn test_range_zero_step() {
        assert!(matches!(range(0, 5, 0), Err(SupportError::Value(_))));
    }

    #[test]
    fn test_range_size_hint_is_exact() {
        let r = range(1, 10, 4).unwrap();
        assert_eq!(r.size_hint(), (3, Some(3)));
        assert_eq!(r.count(), 3);
    }

    #[test]
    fn test_range_is_not_restartable() {
        let mut r = range_to(2);
        assert_eq!(r.by_ref().count(), 2);
        assert_eq!(r.next(), None);
    }

    #[test]
    fn test_enumerate_with_start() {
        let pairs: Vec<_> = enumerate(["a", "b"], 1).collect();
        assert_eq!(pairs, vec![(1, "a"), (2, "b")]);
    }

    #[test]
    fn test_zip_stops_at_shortest() {
        let rows: Vec<_> = zip([vec![1, 2, 3], vec![4, 5]]).collect();
        assert_eq!(rows, vec![vec![1, 4], vec![2, 5]]);
    }

    #[test]
    fn test_count_is_unbounded() {
        let taken: Vec<_> = count(5, -2).take(3).collect();
        assert_eq!(taken, vec![5, 3, 1]);
    }
}
