//! A recency-ordered cache mapping arbitrary keys to values.
//!
//! Backs the per-table query-result cache. Recency is tracked with an
//! intrusive doubly-linked list over a slab of nodes, so promotion and
//! eviction are O(1).
//!
//! A present entry is a hit regardless of its value; absence and "present
//! but empty" are distinguished ([`LruCache::get`] returns `Option`).

use std::collections::HashMap;
use std::hash::Hash;

struct Node<K, V> {
    key: K,
    value: V,
    /// Neighbor toward the most-recently-used end.
    prev: Option<usize>,
    /// Neighbor toward the least-recently-used end.
    next: Option<usize>,
}

/// An LRU cache with optional capacity.
///
/// With `capacity == None` the cache is unbounded. A capacity of zero is
/// permitted and keeps the cache permanently empty.
pub struct LruCache<K, V> {
    map: HashMap<K, usize>,
    nodes: Vec<Option<Node<K, V>>>,
    /// Most-recently-used node.
    head: Option<usize>,
    /// Least-recently-used node; the next eviction victim.
    tail: Option<usize>,
    free_list: Vec<usize>,
    capacity: Option<usize>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Creates a cache that holds at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self::with_capacity(Some(capacity))
    }

    /// Creates a cache that never evicts.
    pub fn unbounded() -> Self {
        Self::with_capacity(None)
    }

    fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            map: HashMap::new(),
            nodes: Vec::new(),
            head: None,
            tail: None,
            free_list: Vec::new(),
            capacity,
        }
    }

    /// Returns the configured capacity, `None` meaning unbounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Looks up `key`, promoting it to most-recently-used on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Inserts or updates `key`, promoting it to most-recently-used.
    ///
    /// On a fresh insert that exceeds the capacity, the least-recently-used
    /// entry is evicted.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(&idx) = self.map.get(&key) {
            if let Some(node) = &mut self.nodes[idx] {
                node.value = value;
            }
            self.move_to_front(idx);
            return;
        }

        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            value,
            prev: None,
            next: self.head,
        });
        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
        self.map.insert(key, idx);

        if let Some(capacity) = self.capacity {
            while self.map.len() > capacity {
                self.evict();
            }
        }
    }

    /// Membership test; does not touch recency.
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterates current keys in least- to most-recently-used order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            cache: self,
            cursor: self.tail,
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }

        self.unlink(idx);
        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = self.head;
        }
        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }
        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match &self.nodes[idx] {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn evict(&mut self) {
        if let Some(tail_idx) = self.tail {
            self.unlink(tail_idx);
            if let Some(node) = self.nodes[tail_idx].take() {
                self.map.remove(&node.key);
            }
            self.free_list.push(tail_idx);
        }
    }

    fn alloc_node(&mut self) -> usize {
        match self.free_list.pop() {
            Some(idx) => idx,
            None => {
                self.nodes.push(None);
                self.nodes.len() - 1
            }
        }
    }
}

/// Iterator over cache keys, least- to most-recently-used.
pub struct Keys<'a, K, V> {
    cache: &'a LruCache<K, V>,
    cursor: Option<usize>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let idx = self.cursor?;
        let node = self.cache.nodes[idx].as_ref()?;
        self.cursor = node.prev;
        Some(&node.key)
    }
}
