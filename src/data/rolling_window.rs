/// A fixed-capacity history buffer, newest element first. Used to give a strategy (or
/// an internal consolidator warming up) direct indexed access to recent bars without
/// re-deriving them from the time-slice stream.
#[derive(Clone, Debug)]
pub struct RollingWindow<T> {
    history: Vec<T>,
    capacity: usize,
}

impl<T: Clone> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        RollingWindow {
            history: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add(&mut self, data: T) {
        self.history.insert(0, data);
        if self.history.len() > self.capacity {
            self.history.pop();
        }
    }

    pub fn last(&self) -> Option<&T> {
        self.history.first()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.history.get(index)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.history.len() == self.capacity
    }

    pub fn history(&self) -> &[T] {
        &self.history
    }
}
