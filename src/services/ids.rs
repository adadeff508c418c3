use uuid::Uuid;

/// Source of fresh activity identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> Uuid;
}

#[derive(Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic ids for tests: 1, 2, 3... encoded in the low bits.
#[cfg(test)]
#[derive(Default)]
pub struct SequentialIds {
    next: u128,
}

#[cfg(test)]
impl SequentialIds {
    /// Restarts the sequence, handing out ids that may already be taken
    pub fn starting_at(next: u128) -> Self {
        Self { next }
    }
}

#[cfg(test)]
impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Uuid {
        self.next += 1;
        Uuid::from_u128(self.next)
    }
}
