use crate::FsiError;

/// Scalar type of every field and geometric quantity.
pub type Real = f64;

/// Guard added to denominators that may legitimately vanish.
pub const SMALL: Real = 1e-15;

/// Pass `v` through, or report it as non-finite under the name `what`.
pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, FsiError> {
    match v.is_finite() {
        true => Ok(v),
        false => Err(FsiError::NonFinite { what, value: v }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_values_pass_through() {
        assert_eq!(ensure_finite(2.5, "omega").unwrap(), 2.5);
    }

    #[test]
    fn nan_and_infinity_are_rejected() {
        let err = ensure_finite(Real::NAN, "residual").unwrap_err();
        assert!(err.to_string().contains("residual"));
        assert!(matches!(
            ensure_finite(Real::NEG_INFINITY, "x"),
            Err(FsiError::NonFinite { what: "x", .. })
        ));
    }
}
