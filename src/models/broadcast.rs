use crate::error::CalcError;

/// Common length of one-dimensional operands under numpy broadcasting rules:
/// every operand must have either the common length or exactly one element.
pub fn broadcast_len(operands: &[(&str, usize)]) -> Result<usize, CalcError> {
    let target = operands
        .iter()
        .map(|&(_, len)| len)
        .find(|&len| len != 1)
        .unwrap_or(1);

    if operands.iter().all(|&(_, len)| len == 1 || len == target) {
        Ok(target)
    } else {
        Err(CalcError::ShapeMismatch {
            shapes: operands
                .iter()
                .map(|&(name, len)| (name.to_string(), len))
                .collect(),
        })
    }
}

/// Element `i` of a broadcast operand.
#[inline]
pub fn at<T: Copy>(values: &[T], i: usize) -> T {
    if values.len() == 1 {
        values[0]
    } else {
        values[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_lengths_and_scalars_broadcast() {
        assert_eq!(broadcast_len(&[("a", 3), ("b", 3)]).unwrap(), 3);
        assert_eq!(broadcast_len(&[("a", 1), ("b", 4), ("c", 1)]).unwrap(), 4);
        assert_eq!(broadcast_len(&[("a", 1), ("b", 1)]).unwrap(), 1);
        assert_eq!(broadcast_len(&[("a", 0), ("b", 1)]).unwrap(), 0);
    }

    #[test]
    fn mismatched_lengths_fail_with_shapes() {
        let err = broadcast_len(&[("couplings", 3), ("velocities", 4)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "operands could not be broadcast together with shapes (3,) (4,)"
        );
        assert!(broadcast_len(&[("a", 0), ("b", 2)]).is_err());
    }

    #[test]
    fn at_repeats_single_values() {
        assert_eq!(at(&[7.0], 5), 7.0);
        assert_eq!(at(&[1.0, 2.0, 3.0], 2), 3.0);
    }
}
