/// A simple slab allocator.
///
/// A `Slab` stores values of type `T` in a contiguous array and returns
/// small indices that are reused after removal. The scheduler keys fibers
/// by slab index and the reactor keys registrations by it.
///
/// Stale indices are harmless: lookups on a freed slot return `None`, and a
/// reused slot simply answers for its new occupant.
pub(crate) struct Slab<T> {
    /// Storage for items; `None` marks a free slot.
    items: Vec<Option<T>>,

    /// Stack of free indices that can be reused.
    free: Vec<usize>,

    /// Number of occupied slots.
    len: usize,
}

impl<T> Slab<T> {
    /// Creates a new `Slab` with room for `capacity` items before growing.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Inserts a value and returns its index.
    ///
    /// The most recently freed slot is reused first.
    pub(crate) fn insert(&mut self, item: T) -> usize {
        self.len += 1;

        match self.free.pop() {
            Some(index) => {
                self.items[index] = Some(item);
                index
            }
            None => {
                self.items.push(Some(item));
                self.items.len() - 1
            }
        }
    }

    /// Removes and returns the value stored at `index`, if any.
    pub(crate) fn remove(&mut self, index: usize) -> Option<T> {
        let item = self.items.get_mut(index)?.take()?;

        self.free.push(index);
        self.len -= 1;

        Some(item)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)?.as_mut()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every value, leaving the slab empty.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        self.free.clear();
        self.len = 0;

        std::mem::take(&mut self.items).into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_reuses_freed_slots() {
        let mut slab = Slab::new(2);

        let a = slab.insert("a");
        let b = slab.insert("b");
        assert_ne!(a, b);
        assert!(!slab.is_empty());

        assert_eq!(slab.remove(a), Some("a"));
        assert_eq!(slab.remove(a), None);

        let c = slab.insert("c");
        assert_eq!(c, a);
        assert_eq!(slab.get_mut(c), Some(&mut "c"));
    }

    #[test]
    fn test_drain_empties_the_slab() {
        let mut slab = Slab::new(0);

        slab.insert(1);
        let two = slab.insert(2);
        slab.insert(3);
        slab.remove(two);

        let mut drained = slab.drain();
        drained.sort();

        assert_eq!(drained, vec![1, 3]);
        assert!(slab.is_empty());
        assert!(slab.get_mut(0).is_none());
        assert_eq!(slab.insert(4), 0);
    }
}
