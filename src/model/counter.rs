/// A plain counter owned by the application root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counter {
    pub value: i64,
}

impl Counter {
    pub fn increment(&mut self) {
        self.value += 1;
    }

    pub fn decrement(&mut self) {
        self.value -= 1;
    }

    pub fn add_by(&mut self, amount: i64) {
        self.value += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_ops() {
        let mut counter = Counter::default();
        counter.increment();
        counter.increment();
        counter.decrement();
        counter.add_by(5);
        assert_eq!(counter.value, 6);
    }
}
