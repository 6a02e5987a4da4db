use crate::config::LimitsParams;
use crate::error::ValidationError;

/// Check that an input of `width`x`height` may enter the pipeline.
///
/// # Errors
/// [`ValidationError::TooSmall`] when either side is below `min_size`,
/// [`ValidationError::AspectRatio`] when `width / height` is out of bounds.
pub fn validate_dimensions(
    width: u32,
    height: u32,
    limits: &LimitsParams,
) -> Result<(), ValidationError> {
    if width < limits.min_size || height < limits.min_size {
        return Err(ValidationError::TooSmall {
            width,
            height,
            min_size: limits.min_size,
        });
    }

    let ratio = width as f32 / height as f32;
    if !(limits.min_aspect..=limits.max_aspect).contains(&ratio) {
        return Err(ValidationError::AspectRatio {
            width,
            height,
            ratio,
            min: limits.min_aspect,
            max: limits.max_aspect,
        });
    }
    Ok(())
}

/// [`validate_dimensions`] against the classic limits.
pub fn validate(width: u32, height: u32) -> Result<(), ValidationError> {
    validate_dimensions(width, height, &LimitsParams::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_image_passes() {
        validate_dimensions(1000, 1000, &LimitsParams::default()).unwrap();
    }

    #[test]
    fn bounds_are_inclusive() {
        let limits = LimitsParams::default();
        validate_dimensions(50, 50, &limits).unwrap();
        validate_dimensions(300, 1000, &limits).unwrap();
        validate_dimensions(300, 100, &limits).unwrap();
    }

    #[test]
    fn reports_offending_dimensions() {
        let err = validate_dimensions(49, 1000, &LimitsParams::default()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooSmall {
                width: 49,
                height: 1000,
                min_size: 50
            }
        );
        assert!(err.to_string().contains("too small"));
    }
}
