use std::collections::VecDeque;
use tracing::error;

/// Fixed-capacity FIFO buffer. Pushing onto a full window evicts the oldest
/// element.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pre-populate with at most `capacity` leading values of `seed`.
    pub fn with_seed<I>(capacity: usize, seed: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut window = Self::new(capacity);
        window.items.extend(seed.into_iter().take(capacity));
        window
    }

    /// Append at the tail, returning the evicted head if the window was full.
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(value);
        }

        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(value);
        self.enforce_capacity();
        evicted
    }

    pub fn extend<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.push(value);
        }
    }

    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// A window holding more than `capacity` items is a defect: debug builds
    /// panic, release builds trim from the head and carry on.
    pub fn enforce_capacity(&mut self) {
        debug_assert!(
            self.items.len() <= self.capacity,
            "rolling window holds {} items, capacity is {}",
            self.items.len(),
            self.capacity
        );

        if self.items.len() <= self.capacity {
            return;
        }

        error!(
            "Capacity violation: {} items in window of {}, trimming",
            self.items.len(),
            self.capacity
        );
        let excess = self.items.len() - self.capacity;
        self.items.drain(..excess);
    }
}

#[cfg(test)]
impl<T: Clone> RollingWindow<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_below_capacity() {
        let mut window = RollingWindow::new(3);
        assert_eq!(window.push(1), None);
        assert_eq!(window.push(2), None);

        assert_eq!(window.len(), 2);
        assert!(!window.is_full());
        assert_eq!(window.to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_push_evicts_oldest_when_full() {
        let mut window = RollingWindow::with_seed(3, vec![1, 2, 3]);
        assert!(window.is_full());

        assert_eq!(window.push(4), Some(1));
        assert_eq!(window.push(5), Some(2));
        assert_eq!(window.len(), 3);
        assert_eq!(window.to_vec(), vec![3, 4, 5]);
    }

    #[test]
    fn test_seed_truncated_to_capacity() {
        let window = RollingWindow::with_seed(2, vec![7, 8, 9]);
        assert_eq!(window.to_vec(), vec![7, 8]);
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut window = RollingWindow::new(75);
        for i in 0..500 {
            window.push(i);
            assert!(window.len() <= 75);
        }
        assert_eq!(window.to_vec().first(), Some(&425));
        assert_eq!(window.back(), Some(&499));
    }

    #[test]
    fn test_extend_rolls_in_order() {
        let mut window = RollingWindow::new(4);
        window.extend(0..6);
        assert_eq!(window.to_vec(), vec![2, 3, 4, 5]);
        assert_eq!(window.len(), 4);
    }

    #[test]
    fn test_zero_capacity_drops_everything() {
        let mut window = RollingWindow::new(0);
        assert_eq!(window.push(1.0), Some(1.0));
        assert!(window.is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "rolling window holds 5 items, capacity is 3")]
    fn test_overfull_window_panics_in_debug() {
        let mut window = RollingWindow::new(3);
        window.items.extend([1, 2, 3, 4, 5]);
        window.enforce_capacity();
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_overfull_window_trimmed_from_head_in_release() {
        let mut window = RollingWindow::new(3);
        window.items.extend([1, 2, 3, 4, 5]);
        window.enforce_capacity();

        assert_eq!(window.len(), 3);
        assert_eq!(window.to_vec(), vec![3, 4, 5]);

        window.push(6);
        assert_eq!(window.to_vec(), vec![4, 5, 6]);
    }
}
