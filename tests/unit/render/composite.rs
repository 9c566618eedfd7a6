use super::*;

const OPAQUE_BLUE: PremulRgba8 = [0, 0, 255, 255];

#[test]
fn invisible_sources_leave_destination() {
    let dst = [12, 34, 56, 78];
    assert_eq!(over(dst, [255, 255, 255, 255], 0.0), dst);
    assert_eq!(over(dst, [90, 90, 90, 0], 1.0), dst);
    assert_eq!(over(dst, [255, 255, 255, 255], -3.0), dst);
}

#[test]
fn opaque_source_wins_at_full_opacity() {
    let red = [255, 0, 0, 255];
    assert_eq!(over(OPAQUE_BLUE, red, 1.0), red);
    assert_eq!(over([0, 0, 0, 0], [40, 50, 60, 90], 1.0), [40, 50, 60, 90]);
}

#[test]
fn layer_opacity_scales_the_source() {
    let out = over(OPAQUE_BLUE, [255, 0, 0, 255], 0.5);
    assert_eq!(out[3], 255);
    assert!((127..=129).contains(&out[0]), "{out:?}");
    assert!((126..=128).contains(&out[2]), "{out:?}");
}

#[test]
fn crossfade_endpoints_and_midpoint() {
    let red = [255, 0, 0, 255];
    assert_eq!(crossfade(red, OPAQUE_BLUE, 0.0), red);
    assert_eq!(crossfade(red, OPAQUE_BLUE, 1.0), OPAQUE_BLUE);
    assert_eq!(crossfade(red, OPAQUE_BLUE, 7.0), OPAQUE_BLUE);
    let mid = crossfade(red, OPAQUE_BLUE, 0.5);
    assert_eq!(mid[3], 255);
    assert_eq!(u16::from(mid[0]) + u16::from(mid[2]), 255);
}

#[test]
fn buffer_helpers_work_pixel_by_pixel() {
    let mut dst = [OPAQUE_BLUE, [0, 0, 0, 0]].concat();
    let src = [[0, 0, 0, 0], [0, 255, 0, 255]].concat();
    over_in_place(&mut dst, &src, 1.0).unwrap();
    assert_eq!(dst, [OPAQUE_BLUE, [0, 255, 0, 255]].concat());

    let a = dst.clone();
    let b = vec![0u8; 8];
    crossfade_in_place(&mut dst, &a, &b, 1.0).unwrap();
    assert_eq!(dst, b);
}

#[test]
fn buffer_helpers_reject_mismatched_lengths() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 12], 1.0).is_err());
    assert!(crossfade_in_place(&mut dst, &[0u8; 8], &[0u8; 5], 0.5).is_err());
    let mut odd = vec![0u8; 6];
    assert!(over_in_place(&mut odd, &[0u8; 6], 1.0).is_err());
}
