/// Analysis settings recognized by the cut set engine.
///
/// The only field the ZBDD core reads is `limit_order`, the maximum allowed
/// cut set cardinality. The limit is a pruning aid during construction and a
/// hard cap on generated cut sets.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Settings {
    limit_order: i32,
}

impl Settings {
    /// Creates settings with the default order limit of 20.
    pub fn new() -> Self {
        Self { limit_order: 20 }
    }

    /// Sets the maximum cut set order.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is not positive.
    pub fn with_limit_order(mut self, limit: i32) -> Self {
        assert!(limit > 0, "The limit on cut set order must be positive");
        self.limit_order = limit;
        self
    }

    /// The maximum allowed cut set cardinality.
    pub fn limit_order(&self) -> i32 {
        self.limit_order
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limit() {
        let settings = Settings::new();
        assert_eq!(settings.limit_order(), 20);
    }

    #[test]
    fn test_with_limit_order() {
        let settings = Settings::new().with_limit_order(3);
        assert_eq!(settings.limit_order(), 3);
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn test_zero_limit_panics() {
        Settings::new().with_limit_order(0);
    }
}
