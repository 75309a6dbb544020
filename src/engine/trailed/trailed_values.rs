use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;

/// Handle to one backtrackable integer in [`TrailedValues`].
#[derive(Debug, Clone, Copy)]
pub struct TrailedInt {
    id: u32,
}

impl Default for TrailedInt {
    fn default() -> Self {
        Self { id: u32::MAX }
    }
}

impl StorageKey for TrailedInt {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        Self { id: index as u32 }
    }
}

#[derive(Debug, Clone)]
struct TrailedChange {
    old_value: i64,
    reference: TrailedInt,
}

/// Backtrackable integers: writes record the old value, and popping a checkpoint rewinds every
/// write made since it.
#[derive(Default, Debug)]
pub struct TrailedValues {
    trail: Trail<TrailedChange>,
    values: KeyedVec<TrailedInt, i64>,
}

impl TrailedValues {
    pub fn grow(&mut self, initial_value: i64) -> TrailedInt {
        self.values.push(initial_value)
    }

    pub fn read(&self, trailed_int: TrailedInt) -> i64 {
        self.values[trailed_int]
    }

    fn write(&mut self, trailed_int: TrailedInt, value: i64) {
        let old_value = self.values[trailed_int];
        if old_value == value {
            return;
        }
        self.trail.record(TrailedChange {
            old_value,
            reference: trailed_int,
        });
        self.values[trailed_int] = value;
    }

    pub fn add_assign(&mut self, trailed_int: TrailedInt, addition: i64) {
        self.write(trailed_int, self.values[trailed_int] + addition);
    }

    pub fn assign(&mut self, trailed_int: TrailedInt, value: i64) {
        self.write(trailed_int, value);
    }

    pub fn push_checkpoint(&mut self) {
        self.trail.push_checkpoint();
    }

    pub fn restore_to_last_checkpoint(&mut self) {
        // Field-level borrows: the drain holds `trail` while the loop writes `values`.
        let values = &mut self.values;
        self.trail
            .pop_checkpoint()
            .for_each(|change| values[change.reference] = change.old_value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_rewind_to_the_matching_checkpoint() {
        let mut values = TrailedValues::default();
        let counter = values.grow(0);

        assert_eq!(0, values.read(counter));

        values.push_checkpoint();
        values.add_assign(counter, 5);
        values.add_assign(counter, 5);
        assert_eq!(10, values.read(counter));

        values.push_checkpoint();
        values.assign(counter, 42);
        assert_eq!(42, values.read(counter));

        values.restore_to_last_checkpoint();
        assert_eq!(10, values.read(counter));

        values.restore_to_last_checkpoint();
        assert_eq!(0, values.read(counter));
    }
}
