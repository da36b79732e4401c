use core::{
	borrow::Borrow,
	hash::{BuildHasher, Hash},
};
use hashbrown::{hash_map::DefaultHashBuilder, hash_map::Entry, HashMap};
use num_traits::{CheckedAdd, CheckedSub, One, Zero};

/// A map of counted entries. Entries whose count drops to zero stay until [`RcHashMap::drain_weak`].
pub(crate) struct RcHashMap<K, C, V, S = DefaultHashBuilder>(HashMap<K, (C, V), S>)
where
	K: Hash + Eq,
	C: CheckedAdd + CheckedSub + One + Zero,
	S: BuildHasher;
impl<K, C, V, S> Default for RcHashMap<K, C, V, S>
where
	K: Hash + Eq,
	C: CheckedAdd + CheckedSub + One + Zero,
	S: Default + BuildHasher,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<K, C, V, S> RcHashMap<K, C, V, S>
where
	K: Hash + Eq,
	C: CheckedAdd + CheckedSub + One + Zero,
	S: BuildHasher,
{
	#[must_use]
	pub fn new() -> Self
	where
		S: Default,
	{
		Self(HashMap::with_hasher(S::default()))
	}

	pub fn increment_or_insert_with<F: FnOnce() -> V>(&mut self, k: K, v: F) -> Result<&mut V, CountSaturatedError> {
		match self.0.entry(k) {
			Entry::Occupied(occupied) => {
				let (c, v) = occupied.into_mut();
				*c = c.checked_add(&C::one()).ok_or(CountSaturatedError)?;
				Ok(v)
			}
			Entry::Vacant(vacant) => {
				let (_, v) = vacant.insert((C::one(), v()));
				Ok(v)
			}
		}
	}

	/// Decrements without removing the entry, so its value can still be used for cleanup.
	pub fn weak_decrement<Q: ?Sized>(&mut self, k: &Q) -> Result<Option<&mut V>, CountSaturatedError>
	where
		K: Borrow<Q>,
		Q: Eq + Hash,
	{
		match self.0.get_mut(k) {
			Some((c, v)) => {
				*c = c.checked_sub(&C::one()).ok_or(CountSaturatedError)?;
				Ok(Some(v))
			}
			None => Ok(None),
		}
	}

	/// Removes and yields all entries with a count of zero.
	pub fn drain_weak(&mut self) -> impl '_ + Iterator<Item = (K, V)>
	where
		K: Clone,
	{
		let weak: Vec<K> = self.0.iter().filter(|(_, (c, _))| c.is_zero()).map(|(k, _)| k.clone()).collect();
		weak.into_iter().filter_map(move |k| self.0.remove(&k).map(|(_, v)| (k, v)))
	}

	/// The number of entries with a non-zero count.
	pub fn strong_len(&self) -> usize {
		self.0.values().filter(|(c, _)| !c.is_zero()).count()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn capacity(&self) -> usize {
		self.0.capacity()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CountSaturatedError;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_and_drains() {
		let mut map = RcHashMap::<&str, u8, i32>::new();
		assert_eq!(*map.increment_or_insert_with("a", || 1).unwrap(), 1);
		assert_eq!(*map.increment_or_insert_with("a", || 2).unwrap(), 1);
		map.increment_or_insert_with("b", || 3).unwrap();
		assert_eq!(map.strong_len(), 2);

		assert_eq!(map.weak_decrement("a").unwrap().copied(), Some(1));
		assert_eq!(map.drain_weak().count(), 0);
		map.weak_decrement("a").unwrap();
		map.weak_decrement("b").unwrap();
		assert_eq!(map.strong_len(), 0);
		assert_eq!(map.len(), 2);

		let mut drained = map.drain_weak().collect::<Vec<_>>();
		drained.sort_unstable();
		assert_eq!(drained, [("a", 1), ("b", 3)]);
		assert_eq!(map.len(), 0);
	}

	#[test]
	fn saturation() {
		let mut map = RcHashMap::<u8, u8, ()>::new();
		assert_eq!(map.weak_decrement(&0_u8).unwrap(), None);
		map.increment_or_insert_with(0, || ()).unwrap();
		map.weak_decrement(&0_u8).unwrap();
		assert_eq!(map.weak_decrement(&0_u8).err(), Some(CountSaturatedError));
		for _ in 0..u8::MAX {
			map.increment_or_insert_with(0, || ()).unwrap();
		}
		assert_eq!(map.increment_or_insert_with(0, || ()).err(), Some(CountSaturatedError));
	}
}
