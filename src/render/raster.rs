//! Scanline triangle fill. Pixels are sampled at their centres and owned by a triangle
//! under the top-left rule: rows cover `[ceil(y_top - 0.5), ceil(y_bottom - 0.5))` and spans
//! cover `[ceil(x_left - 0.5), ceil(x_right - 0.5))`, so triangles sharing an edge never
//! both write the pixels on it.

use std::ops::Range;

use super::projection::ScreenPoint;

/// Twice the signed screen area below which a triangle counts as degenerate.
pub const MIN_DOUBLE_AREA: f64 = 1.0e-9;

fn edge(a: &ScreenPoint, b: &ScreenPoint, px: f64, py: f64) -> f64 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

fn double_area(tri: &[ScreenPoint; 3]) -> f64 {
    edge(&tri[0], &tri[1], tri[2].x, tri[2].y)
}

/// Zero screen-space height or collinear vertices.
pub fn is_degenerate(tri: &[ScreenPoint; 3]) -> bool {
    let top = tri.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let bottom = tri.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    !(bottom > top) || double_area(tri).abs() < MIN_DOUBLE_AREA
}

/// x where the edge from `upper` to `lower` crosses the horizontal line `y`.
fn edge_x(upper: &ScreenPoint, lower: &ScreenPoint, y: f64) -> f64 {
    upper.x + (y - upper.y) * (lower.x - upper.x) / (lower.y - upper.y)
}

/// First pixel index whose centre lies at or after `coord`, clamped into `bounds`.
fn first_covered(coord: f64, bounds: &Range<usize>) -> usize {
    let c = (coord - 0.5).ceil();
    if c <= bounds.start as f64 {
        bounds.start
    } else if c >= bounds.end as f64 {
        bounds.end
    } else {
        c as usize
    }
}

/// Walks the pixels of `tri` inside `rows` and the columns `0..width`, top to bottom and
/// left to right, calling `plot(x, y, weights)` once per covered pixel. `weights` are the
/// barycentric weights of the pixel centre with respect to `tri` in its given order.
/// Returns `false` without plotting for degenerate triangles.
pub fn scan_triangle(
    tri: &[ScreenPoint; 3],
    rows: Range<usize>,
    width: usize,
    mut plot: impl FnMut(usize, usize, [f64; 3]),
) -> bool {
    if is_degenerate(tri) {
        return false;
    }
    let area = double_area(tri);

    let mut sorted = [&tri[0], &tri[1], &tri[2]];
    sorted.sort_by(|a, b| a.y.total_cmp(&b.y));
    let [top, mid, bottom] = sorted;

    let columns = 0..width;
    let y_start = first_covered(top.y, &rows);
    let y_end = first_covered(bottom.y, &rows);

    for y in y_start..y_end {
        let py = y as f64 + 0.5;
        let long = edge_x(top, bottom, py);
        let short = if py < mid.y {
            edge_x(top, mid, py)
        } else {
            edge_x(mid, bottom, py)
        };
        let (left, right) = if long <= short {
            (long, short)
        } else {
            (short, long)
        };

        let x_start = first_covered(left, &columns);
        let x_end = first_covered(right, &columns);
        for x in x_start..x_end {
            let px = x as f64 + 0.5;
            let weights = [
                edge(&tri[1], &tri[2], px, py) / area,
                edge(&tri[2], &tri[0], px, py) / area,
                edge(&tri[0], &tri[1], px, py) / area,
            ];
            plot(x, y, weights);
        }
    }
    true
}

/// Depth at a pixel from the triangle's vertex depths.
pub fn interpolate_depth(tri: &[ScreenPoint; 3], weights: [f64; 3]) -> f64 {
    tri[0].depth * weights[0] + tri[1].depth * weights[1] + tri[2].depth * weights[2]
}
