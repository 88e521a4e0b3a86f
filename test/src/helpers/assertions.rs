/// Assert that a condition becomes true within the given number of milliseconds
#[macro_export]
macro_rules! assert_eventually {
    ($millis:expr, $condition:expr) => {
        assert!(
            $crate::helpers::wait_until(std::time::Duration::from_millis($millis), || $condition),
            "condition did not hold within {} ms: {}",
            $millis,
            stringify!($condition)
        );
    };
}

/// Assert that a condition stays false for the given number of milliseconds
#[macro_export]
macro_rules! assert_never {
    ($millis:expr, $condition:expr) => {
        assert!(
            !$crate::helpers::wait_until(std::time::Duration::from_millis($millis), || $condition),
            "condition unexpectedly held within {} ms: {}",
            $millis,
            stringify!($condition)
        );
    };
}
