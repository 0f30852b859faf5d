pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Fails the enclosing function with `InvalidArgument` unless `$expr` holds.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

/// Reserves exactly `additional` slots in `vec`, reporting failure as
/// `AllocationFailed` instead of aborting.
#[inline]
pub fn try_reserve_exact<T>(vec: &mut Vec<T>, additional: usize, context: &str) -> Result<()> {
    vec.try_reserve_exact(additional)
        .map_err(|e| crate::error::Error::allocation_failed(context, e))
}
