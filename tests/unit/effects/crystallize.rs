use super::*;
use crate::foundation::core::Rgba8Premul;

#[test]
fn uniform_images_stay_uniform() {
    let img = Raster::solid(30, 30, Rgba8Premul::from_straight_rgba(10, 200, 30, 255))
        .unwrap()
        .at(5, -4);
    let mut f = Crystallize::new(6.0, Point::new(0.0, 0.0));
    let out = f
        .apply(&img, FilterTimes::default(), &RenderSettings::default())
        .unwrap();
    assert_eq!(out.origin(), (5, -4));
    assert_eq!(out, img);
}

#[test]
fn cells_flatten_gradients() {
    let mut data = Vec::new();
    for _y in 0..20u32 {
        for x in 0..20u32 {
            data.extend_from_slice(&[(x * 12) as u8, 0, 0, 255]);
        }
    }
    let img = Raster::from_straight(20, 20, data).unwrap();
    let mut f = Crystallize::new(10.0, Point::new(0.0, 0.0));
    let out = f
        .apply(&img, FilterTimes::default(), &RenderSettings::default())
        .unwrap();
    let mut distinct: Vec<u8> = (0..20).map(|x| out.pixel_at(x, 10)[0]).collect();
    distinct.dedup();
    assert!(distinct.len() < 20);
}

#[test]
fn small_radius_is_identity() {
    let img = Raster::solid(3, 3, Rgba8Premul::from_straight_rgba(1, 2, 3, 255)).unwrap();
    let mut f = Crystallize::new(0.5, Point::ZERO);
    let out = f
        .apply(&img, FilterTimes::default(), &RenderSettings::default())
        .unwrap();
    assert_eq!(out, img);
}
