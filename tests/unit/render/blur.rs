use super::*;

fn alpha_row(out: &[u8], width: u32, y: u32) -> Vec<u8> {
    (0..width)
        .map(|x| out[((y * width + x) * 4 + 3) as usize])
        .collect()
}

#[test]
fn zero_radius_returns_input() {
    let src: Vec<u8> = (0..24).collect();
    assert_eq!(blur_rgba8_premul(&src, 3, 2, 0, 4.0).unwrap(), src);
}

#[test]
fn flat_colour_survives_any_kernel() {
    let src = [64u8, 32, 16, 128].repeat(6 * 5);
    for (radius, sigma) in [(1, 0.5), (4, 2.0), (12, 6.0)] {
        assert_eq!(blur_rgba8_premul(&src, 6, 5, radius, sigma).unwrap(), src);
    }
}

#[test]
fn point_spreads_symmetrically_and_keeps_its_mass() {
    let (w, h) = (7u32, 7u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let mid = ((3 * w + 3) * 4) as usize;
    src[mid..mid + 4].copy_from_slice(&[255; 4]);

    let out = blur_rgba8_premul(&src, w, h, 3, 1.5).unwrap();
    let row = alpha_row(&out, w, 3);
    assert_eq!(row[2], row[4]);
    assert_eq!(row[1], row[5]);
    assert!(row[3] > row[2] && row[2] > row[1]);

    let mass: i32 = out.chunks_exact(4).map(|px| i32::from(px[3])).sum();
    assert!((mass - 255).abs() <= 16, "mass {mass}");
}

#[test]
fn edges_clamp_instead_of_darkening() {
    // Left half opaque: the outer column keeps full alpha because samples past the edge
    // repeat the border pixel.
    let (w, h) = (8u32, 1u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    for x in 0..4 {
        let i = (x * 4) as usize;
        src[i..i + 4].copy_from_slice(&[255; 4]);
    }
    let out = blur_rgba8_premul(&src, w, h, 2, 1.0).unwrap();
    let row = alpha_row(&out, w, 0);
    assert_eq!(row[0], 255);
    assert!(row[3] < 255 && row[4] > 0);
    assert!(row.windows(2).all(|p| p[0] >= p[1]));
}

#[test]
fn invalid_inputs_are_errors() {
    let src = vec![0u8; 16];
    assert!(blur_rgba8_premul(&src, 2, 2, 2, -1.0).is_err());
    assert!(blur_rgba8_premul(&src, 2, 2, 2, f32::NAN).is_err());
    assert!(blur_rgba8_premul(&src, 4, 2, 1, 1.0).is_err());
}
