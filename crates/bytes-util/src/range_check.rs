//! Guard for values that must fit a bounded wire field.

/// Enforces that a number is within the specified \[LOWER, UPPER\] bounds,
/// evaluating to an [`std::io::Result<()>`].
///
/// The brackets indicate that this range is inclusive on both sides. An
/// out-of-range value yields an [`std::io::ErrorKind::InvalidData`] error
/// naming the offending expression.
#[macro_export]
macro_rules! range_check {
    ($n:expr, $lower:expr, $upper:expr) => {{
        let n = $n;

        #[allow(unused_comparisons, clippy::manual_range_contains)]
        if n < $lower || n > $upper {
            ::std::result::Result::Err(::std::io::Error::new(
                ::std::io::ErrorKind::InvalidData,
                format!(
                    "{} is out of range [{}, {}]: {}",
                    stringify!($n),
                    $lower,
                    $upper,
                    n
                ),
            ))
        } else {
            ::std::result::Result::Ok(())
        }
    }};
}
