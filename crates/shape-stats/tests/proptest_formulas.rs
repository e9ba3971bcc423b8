//! Property-based tests for shape descriptors and masks.

use std::f64::consts::PI;

use proptest::prelude::*;
use shape_stats::{
    LabelImage, StatsErrorCode, VoxelFeature, VoxelFeatureMeasurer, VoxelMeasurer, binary_mask,
    padded_mask, perimeter_to_area, solidity, sphericity_legland, sphericity_wadell,
};

// =============================================================================
// Strategies
// =============================================================================

fn arb_positive() -> impl Strategy<Value = f64> {
    1e-3f64..1e6
}

/// Small label images with labels 0..4.
fn arb_label_image() -> impl Strategy<Value = LabelImage<u8>> {
    (1usize..6, 1usize..6, 1usize..6).prop_flat_map(|(nx, ny, nz)| {
        prop::collection::vec(0u8..4, nx * ny * nz).prop_map(move |data| {
            LabelImage::from_fn([nx, ny, nz], |x, y, z| data[x + y * nx + z * nx * ny])
        })
    })
}

// =============================================================================
// Formula Properties
// =============================================================================

proptest! {
    #[test]
    fn proptest_wadell_closed_form(v in arb_positive(), a in arb_positive()) {
        let expected = PI.powf(1.0 / 3.0) * (6.0 * v).powf(2.0 / 3.0) / a;
        let got = sphericity_wadell(v, a).unwrap();
        prop_assert!((got - expected).abs() <= 1e-9 * expected.max(1.0));
    }

    #[test]
    fn proptest_legland_closed_form(v in arb_positive(), a in arb_positive()) {
        let expected = 36.0 * PI * v * v / (a * a * a);
        let got = sphericity_legland(v, a).unwrap();
        prop_assert!((got - expected).abs() <= 1e-9 * expected.max(1.0));
    }

    #[test]
    fn proptest_legland_is_wadell_cubed(v in arb_positive(), a in arb_positive()) {
        let w = sphericity_wadell(v, a).unwrap();
        let l = sphericity_legland(v, a).unwrap();
        prop_assert!((l - w.powi(3)).abs() <= 1e-9 * l.max(1e-300));
    }

    #[test]
    fn proptest_solidity_is_ratio(sv in arb_positive(), hv in arb_positive()) {
        prop_assert_eq!(solidity(sv, hv).unwrap(), sv / hv);
    }

    #[test]
    fn proptest_zero_denominator_fails(x in arb_positive()) {
        prop_assert_eq!(solidity(x, 0.0).unwrap_err().code(), StatsErrorCode::Arithmetic);
        prop_assert_eq!(sphericity_wadell(x, 0.0).unwrap_err().code(), StatsErrorCode::Arithmetic);
        prop_assert_eq!(sphericity_legland(x, 0.0).unwrap_err().code(), StatsErrorCode::Arithmetic);
    }

    #[test]
    fn proptest_sphere_scores_one(r in 0.1f64..1e3) {
        let volume = 4.0 / 3.0 * PI * r.powi(3);
        let area = 4.0 * PI * r * r;
        prop_assert!((sphericity_wadell(volume, area).unwrap() - 1.0).abs() < 1e-9);
        prop_assert!((sphericity_legland(volume, area).unwrap() - 1.0).abs() < 1e-9);
        prop_assert!((perimeter_to_area(area, volume).unwrap() - 1.0).abs() < 1e-9);
    }

    /// Sphericity is scale-invariant.
    #[test]
    fn proptest_wadell_scale_invariant(v in 1.0f64..1e3, a in 1.0f64..1e3, k in 0.1f64..10.0) {
        let base = sphericity_wadell(v, a).unwrap();
        let scaled = sphericity_wadell(v * k.powi(3), a * k * k).unwrap();
        prop_assert!((base - scaled).abs() <= 1e-9 * base);
    }
}

// =============================================================================
// Mask and Voxel Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proptest_padded_mask_shape_and_border(image in arb_label_image()) {
        let [nx, ny, nz] = image.dims();
        for label in image.unique_labels() {
            let mask = padded_mask(&image, label);
            prop_assert_eq!(mask.dims(), [nx + 2, ny + 2, nz + 2]);
            prop_assert!(mask.is_border_clear());
            prop_assert_eq!(mask.count_ones(), image.voxel_count(label));
        }
    }

    #[test]
    fn proptest_unique_labels_sorted(image in arb_label_image()) {
        let labels = image.unique_labels();
        prop_assert!(labels.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(!labels.contains(&0));
    }

    /// Component sizes add up to the label's voxel count.
    #[test]
    fn proptest_components_partition_label(image in arb_label_image()) {
        let measurer = VoxelFeatureMeasurer::default();
        for label in image.unique_labels() {
            let components = measurer
                .measure(&binary_mask(&image, label), [1.0; 3], &[VoxelFeature::Size])
                .unwrap();
            let total: f64 = components.iter().filter_map(|c| c.size).sum();
            prop_assert_eq!(total as usize, image.voxel_count(label));
            prop_assert!(components.iter().enumerate().all(|(i, c)| c.id == i + 1));
        }
    }
}
