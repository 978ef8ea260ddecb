//! RAII guard for notification suppression

use std::cell::Cell;

/// Holds a depth counter raised for as long as the guard lives.
///
/// Every exit path, including `?` and panics unwinding through the holder,
/// lowers the counter again.
pub(crate) struct NotifyGuard<'a> {
    depth: &'a Cell<usize>,
}

impl<'a> NotifyGuard<'a> {
    pub(crate) fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self { depth }
    }
}

impl<'a> Drop for NotifyGuard<'a> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_raises_and_restores() {
        let depth = Cell::new(0);
        {
            let _outer = NotifyGuard::enter(&depth);
            assert_eq!(depth.get(), 1);
            {
                let _inner = NotifyGuard::enter(&depth);
                assert_eq!(depth.get(), 2);
            }
            assert_eq!(depth.get(), 1);
        }
        assert_eq!(depth.get(), 0);
    }

    #[test]
    fn test_guard_released_on_unwind() {
        let depth = Cell::new(0);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = NotifyGuard::enter(&depth);
            panic!("getter failed");
        }));
        assert!(result.is_err());
        assert_eq!(depth.get(), 0);
    }
}
