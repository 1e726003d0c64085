use std::marker::PhantomData;

/// Index types that can address a slot in a [Slab].
///
/// Implemented by the handle types of the scene so that a pin handle can never be used
/// to look up an item and vice versa.
pub trait SlabKey: Copy + Eq {
    /// Returns the key for slot number `slot`.
    fn from_slot(slot: usize) -> Self;
    /// Returns the slot number this key addresses.
    fn slot(&self) -> usize;
}

/// Simple slab arena. Stores items of the same type behind typed keys and reuses removed slots.
///
/// Keys stay valid until the item they point to is removed, every other item keeps its key,
/// which is what lets pins and items reference each other without shared ownership.
///
/// # Example
///
/// ```
/// # use kickgates::data_structures::Slab;
/// # use kickgates::PinIndex;
/// let mut s = Slab::<PinIndex, _>::new();
///
/// let index = s.insert(5);
/// assert_eq!(s.get(index), Some(&5));
///
/// assert_eq!(s.remove(index), Some(5));
///
/// assert_eq!(s.get(index), None);
/// ```
#[derive(Debug, Clone)]
pub struct Slab<K: SlabKey, T> {
    data: Vec<Option<T>>,
    removed_indexes: Vec<K>,
    _key: PhantomData<K>,
}

impl<K: SlabKey, T> Slab<K, T> {
    /// Returns an empty [Slab].
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            removed_indexes: Default::default(),
            _key: PhantomData,
        }
    }

    /// Inserts an item into the slab and returns its key.
    ///
    /// Will reuse an empty slot if one is available.
    pub fn insert(&mut self, item: T) -> K {
        if let Some(key) = self.removed_indexes.pop() {
            self.data[key.slot()] = Some(item);
            key
        } else {
            let key = K::from_slot(self.data.len());
            self.data.push(Some(item));
            key
        }
    }

    /// Returns the key the next call to [Slab::insert] will hand out.
    pub fn next_key(&self) -> K {
        match self.removed_indexes.last() {
            Some(key) => *key,
            None => K::from_slot(self.data.len()),
        }
    }

    /// Returns a mutable reference to the item at `key`.
    ///
    /// Returns [None] if `key` has been removed.
    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.data.get_mut(key.slot()).and_then(Option::as_mut)
    }

    /// Return a reference to the item at `key`.
    ///
    /// Returns [None] if `key` has been removed.
    pub fn get(&self, key: K) -> Option<&T> {
        self.data.get(key.slot()).and_then(Option::as_ref)
    }

    /// Returns true if `key` points to a live item.
    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Removes an item from the Slab and returns it.
    ///
    /// Returns [None] if `key` has already been removed.
    /// `key` will be reused on the next call to [Slab::insert].
    pub fn remove(&mut self, key: K) -> Option<T> {
        let item = self.data.get_mut(key.slot())?.take()?;
        self.removed_indexes.push(key);
        Some(item)
    }

    /// Removes every item, keys handed out so far become invalid.
    pub fn clear(&mut self) {
        self.data.clear();
        self.removed_indexes.clear();
    }

    /// Returns the number of items in the slab.
    ///
    /// This is different from the number of allocated slots in the slab, see [Slab::total_len]
    pub fn len(&self) -> usize {
        self.data.len() - self.removed_indexes.len()
    }

    /// Returns true if the number of items in the slab is 0.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of allocated slots in the slab, some of them could be empty.
    pub fn total_len(&self) -> usize {
        self.data.len()
    }

    /// Returns an iterator over pairs of `(K, &T)` in slot order.
    pub fn iter(&self) -> Iter<K, T> {
        Iter {
            iter: self.data.iter().enumerate(),
            _key: PhantomData,
        }
    }

    /// Returns an iterator over the live keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().map(|(key, _)| key)
    }
}

/// [Iterator] for [Slab]
pub struct Iter<'a, K, T> {
    iter: std::iter::Enumerate<std::slice::Iter<'a, Option<T>>>,
    _key: PhantomData<K>,
}
impl<'a, K: SlabKey, T> Iterator for Iter<'a, K, T> {
    type Item = (K, &'a T);
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (i, item) = self.iter.next()?;
            if let Some(item) = item {
                return Some((K::from_slot(i), item));
            }
        }
    }
}

impl<K: SlabKey, T> Default for Slab<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
