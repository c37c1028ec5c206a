use strata_density::DensityError;

/// Errors raised while turning planet definitions into graphs and rules.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration `{field}`: {reason}")]
    Configuration { field: String, reason: String },

    /// A composed graph references a sub-graph that is not defined.
    #[error("unresolved reference {namespace}:{name}")]
    UnresolvedReference { namespace: String, name: String },

    /// A planet with this id is already registered.
    #[error("duplicate planet identifier: {0}")]
    DuplicatePlanetIdentifier(String),
}

impl TerrainError {
    pub(crate) fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<DensityError> for TerrainError {
    fn from(err: DensityError) -> Self {
        match err {
            DensityError::UnresolvedReference { namespace, name } => {
                Self::UnresolvedReference { namespace, name }
            }
            other => Self::config("density", other.to_string()),
        }
    }
}

/// Checks that `value` is finite and lies in `min..=max`.
pub(crate) fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), TerrainError> {
    if !value.is_finite() {
        return Err(TerrainError::config(field, format!("{value} is not finite")));
    }
    if value < min || value > max {
        return Err(TerrainError::config(
            field,
            format!("{value} is outside {min}..={max}"),
        ));
    }
    Ok(())
}

/// Checks that `value` is finite and strictly positive.
pub(crate) fn check_positive(field: &str, value: f64) -> Result<(), TerrainError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(TerrainError::config(
            field,
            format!("{value} must be finite and positive"),
        ));
    }
    Ok(())
}

pub(crate) fn check_finite(field: &str, value: f64) -> Result<(), TerrainError> {
    if !value.is_finite() {
        return Err(TerrainError::config(field, format!("{value} is not finite")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_errors_keep_their_kind() {
        let err: TerrainError = DensityError::UnresolvedReference {
            namespace: "moon".into(),
            name: "ridges".into(),
        }
        .into();
        assert_eq!(
            err,
            TerrainError::UnresolvedReference {
                namespace: "moon".into(),
                name: "ridges".into()
            }
        );
    }

    #[test]
    fn test_other_density_errors_become_configuration() {
        let err: TerrainError = DensityError::InvalidSpline("no points").into();
        assert!(matches!(err, TerrainError::Configuration { field, .. } if field == "density"));
    }

    #[test]
    fn test_range_checks() {
        assert!(check_range("caves.frequency", 2.0, 0.0, 2.0).is_ok());
        assert!(check_range("caves.frequency", 2.01, 0.0, 2.0).is_err());
        assert!(check_range("caves.frequency", f64::NAN, 0.0, 2.0).is_err());
        assert!(check_positive("scale", 0.0).is_err());
    }
}
