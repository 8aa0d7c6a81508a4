//! Regression fixtures for the pattern field. Values were computed by hand
//! from the cell search and must not drift.

use voronoi_backdrop::color::Rgb;
use voronoi_backdrop::pattern::{nearest_cell, rasterize, shade_pixel, PatternParameters};

fn params(accent: [f64; 3], time: f64) -> PatternParameters {
    let mut p = PatternParameters::new((800, 600), 0.1);
    p.base_color = [0.0; 3];
    p.accent_color = accent;
    p.scale = -0.44;
    p.speed = 0.1;
    p.time = time;
    p
}

fn close(a: [f64; 3], b: [f64; 3]) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
}

#[test]
fn center_pixel_black_to_white() {
    let c = shade_pixel(400, 300, &params([1.0; 3], 0.0));
    let g = 0.6328944075539766;
    assert!(close(c, [g, g, g]), "{c:?}");
}

#[test]
fn center_pixel_tinted_accent() {
    let c = shade_pixel(400, 300, &params([0.85, 0.31, 0.31], 0.0));
    assert!(
        close(c, [0.5379602464208801, 0.19619726634173276, 0.19619726634173276]),
        "{c:?}"
    );
}

#[test]
fn time_moves_feature_points_but_not_cell_colors() {
    // At t = 2.5 the same cell still wins, only the distance changes.
    let c = shade_pixel(400, 300, &params([1.0; 3], 2.5));
    let g = 0.6328944075539766;
    assert!(close(c, [g, g, g]), "{c:?}");

    let x = 6.0 * (-1763.0 / 6000.0);
    let y = 6.0 * (-1323.0 / 6000.0);
    let hit = nearest_cell(x, y, 2.5, 0.1);
    assert_eq!(hit.cell, (-3.0, -2.0));
    assert!((hit.distance - 0.34098455631625724).abs() < 1e-9);
}

#[test]
fn raster_is_reproducible() {
    let mut p = params(Rgb::new(0xd9, 0x4f, 0x4f).to_unit(), 3.0);
    p.resolution = (64, 48);
    let mut a = vec![0u8; 64 * 48 * 4];
    let mut b = vec![0u8; 64 * 48 * 4];
    rasterize(&p, &mut a).unwrap();
    rasterize(&p, &mut b).unwrap();
    assert_eq!(a, b);
}
