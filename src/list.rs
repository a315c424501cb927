//! Singly-linked ordered container
//!
//! Elements keep insertion order until explicitly re-sorted. Every operation
//! walks the chain, so lists are expected to stay short.

use std::fmt;

struct Node<T> {
    value: T,
    next: Option<Box<Node<T>>>,
}

pub struct LinkedList<T> {
    head: Option<Box<Node<T>>>,
    len: usize,
}

impl<T> LinkedList<T> {
    pub fn new() -> Self {
        Self { head: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Add an element at the tail
    pub fn append(&mut self, value: T) {
        let mut cursor = &mut self.head;
        while let Some(node) = cursor {
            cursor = &mut node.next;
        }
        *cursor = Some(Box::new(Node { value, next: None }));
        self.len += 1;
    }

    /// Detach and return the head element
    pub fn remove_first(&mut self) -> Option<T> {
        self.unlink(0)
    }

    /// Element at position `index`, counting from the head
    pub fn get(&self, index: usize) -> Option<&T> {
        self.iter().nth(index)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    /// Reorder ascending by `key`, keeping equal keys in their current order
    ///
    /// Nodes are moved one at a time from the old chain into a freshly built
    /// sorted chain; no element is copied.
    pub fn sort_by_key<K, F>(&mut self, key: F)
    where
        K: Ord,
        F: Fn(&T) -> K,
    {
        let mut sorted: Option<Box<Node<T>>> = None;
        let mut rest = self.head.take();

        while let Some(mut node) = rest {
            rest = node.next.take();
            let node_key = key(&node.value);

            let mut cursor = &mut sorted;
            while cursor
                .as_ref()
                .is_some_and(|placed| key(&placed.value) <= node_key)
            {
                if let Some(placed) = cursor {
                    cursor = &mut placed.next;
                }
            }

            node.next = cursor.take();
            *cursor = Some(node);
        }

        self.head = sorted;
    }

    fn unlink(&mut self, index: usize) -> Option<T> {
        let mut cursor = &mut self.head;
        for _ in 0..index {
            cursor = &mut cursor.as_mut()?.next;
        }
        let node = cursor.take()?;
        *cursor = node.next;
        self.len -= 1;
        Some(node.value)
    }
}

impl<T: PartialEq> LinkedList<T> {
    /// Remove the first element equal to `value`
    pub fn remove(&mut self, value: &T) -> bool {
        match self.iter().position(|item| item == value) {
            Some(index) => self.unlink(index).is_some(),
            None => false,
        }
    }

    pub fn includes(&self, value: &T) -> bool {
        self.iter().any(|item| item == value)
    }
}

impl<T> Default for LinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for LinkedList<T> {
    fn drop(&mut self) {
        // Unlink iteratively so long chains don't recurse through Box drops
        let mut rest = self.head.take();
        while let Some(mut node) = rest {
            rest = node.next.take();
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for LinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = LinkedList::new();
        for value in iter {
            list.append(value);
        }
        list
    }
}

impl<'a, T> IntoIterator for &'a LinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            &node.value
        })
    }
}
