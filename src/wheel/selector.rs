use rand::Rng;

use crate::config::{EXTRA_TURNS, LANDING_OFFSET_DEG};
use crate::error::{AppError, Result};
use crate::types::SelectionResult;

/// Draw a winning slice uniformly from `[0, len)`.
pub fn pick_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Result<usize> {
    if len == 0 {
        return Err(AppError::EmptyWheel);
    }
    Ok(rng.random_range(0..len))
}

/// Forward rotation (degrees) that brings the centre of slice `selected_index`
/// under the pointer. Slices are drawn clockwise from the pointer at 0°, each
/// `360 / len` wide. Floating-point throughout so slice boundaries match the
/// drawn wheel for any option count.
pub fn rotation_for(selected_index: usize, len: usize) -> Result<f64> {
    if len == 0 {
        return Err(AppError::InvalidArgument("cannot rotate an empty wheel".to_string()));
    }
    if selected_index >= len {
        return Err(AppError::InvalidArgument(format!(
            "slice {selected_index} does not exist on a wheel of {len}"
        )));
    }

    let sweep = 360.0 / len as f64;
    let target = sweep * selected_index as f64 + sweep / 2.0;
    let offset = LANDING_OFFSET_DEG.min(sweep / 4.0);
    Ok(360.0 - target + offset)
}

/// Pick a winner and compute how far the animation must spin to land on it.
pub fn select<R: Rng + ?Sized>(rng: &mut R, options: &[String]) -> Result<SelectionResult> {
    let selected_index = pick_index(rng, options.len())?;
    let target_rotation = rotation_for(selected_index, options.len())?;
    Ok(SelectionResult {
        selected_index,
        target_rotation,
        spin_degrees: f64::from(EXTRA_TURNS) * 360.0 + target_rotation,
        winner: options[selected_index].clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Slice under the pointer after rotating forward by `rotation` degrees.
    fn slice_under_pointer(rotation: f64, len: usize) -> usize {
        let sweep = 360.0 / len as f64;
        let angle = (360.0 - rotation).rem_euclid(360.0);
        (angle / sweep).floor() as usize % len
    }

    #[test]
    fn empty_wheel_cannot_be_picked() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(pick_index(&mut rng, 0), Err(AppError::EmptyWheel)));
        assert!(matches!(rotation_for(0, 0), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn rotation_for_four_slices() {
        // sweep 90, slice 1 centre at 135, offset 5
        assert!((rotation_for(1, 4).unwrap() - 230.0).abs() < 1e-9);
        assert!((rotation_for(0, 4).unwrap() - 320.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_rejects_missing_slice() {
        assert!(matches!(rotation_for(4, 4), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn picks_are_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 5;
        let trials = 50_000;
        let mut counts = vec![0usize; n];
        for _ in 0..trials {
            counts[pick_index(&mut rng, n).unwrap()] += 1;
        }
        let expected = trials / n;
        for (i, &c) in counts.iter().enumerate() {
            let deviation = (c as f64 - expected as f64).abs() / expected as f64;
            assert!(deviation < 0.05, "index {i} drawn {c} times, expected ~{expected}");
        }
    }

    #[test]
    fn select_reports_winner_text() {
        let options: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let result = select(&mut rng, &options).unwrap();
        assert_eq!(result.winner, options[result.selected_index]);
        assert!((result.spin_degrees - result.target_rotation - 720.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn pick_index_stays_in_range(len in 1usize..500, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            prop_assert!(pick_index(&mut rng, len).unwrap() < len);
        }

        #[test]
        fn rotation_is_deterministic(len in 1usize..500, pick in any::<prop::sample::Index>()) {
            let index = pick.index(len);
            prop_assert_eq!(rotation_for(index, len).unwrap(), rotation_for(index, len).unwrap());
        }

        #[test]
        fn rotation_lands_on_selected_slice(len in 1usize..500, pick in any::<prop::sample::Index>()) {
            let index = pick.index(len);
            let rotation = rotation_for(index, len).unwrap();
            prop_assert_eq!(slice_under_pointer(rotation, len), index);
        }
    }
}
