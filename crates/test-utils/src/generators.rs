//! Synthetic data generators.
//!
//! Cubes are `[time, y, x]` in row-major order, matching the layout the
//! in-memory dataset and the NetCDF fixture writer expect.

/// Value stored at `(t, row, col)` by [`create_test_cube`].
pub fn cube_value(t: usize, row: usize, col: usize) -> f64 {
    (t * 1_000_000 + col * 1000 + row) as f64
}

/// Creates a cube with predictable values: `t * 1_000_000 + col * 1000 + row`.
///
/// ```
/// use test_utils::create_test_cube;
///
/// let cube = create_test_cube(2, 3, 4);
/// assert_eq!(cube.len(), 24);
/// assert_eq!(cube[1], 1000.0);      // t=0, row=0, col=1
/// assert_eq!(cube[4], 1.0);         // t=0, row=1, col=0
/// assert_eq!(cube[12], 1_000_000.0); // t=1, row=0, col=0
/// ```
pub fn create_test_cube(nt: usize, ny: usize, nx: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(nt * ny * nx);
    for t in 0..nt {
        for row in 0..ny {
            for col in 0..nx {
                data.push(cube_value(t, row, col));
            }
        }
    }
    data
}

/// Deterministic daily rainfall totals in mm, mostly dry.
pub fn create_rainfall_cube(nt: usize, ny: usize, nx: usize, seed: u32) -> Vec<f64> {
    let mut data = Vec::with_capacity(nt * ny * nx);
    for t in 0..nt {
        for row in 0..ny {
            for col in 0..nx {
                let hash = simple_hash(col as u32, row as u32, seed.wrapping_add(t as u32));
                let rain = if hash % 3 == 0 {
                    (hash % 400) as f64 / 10.0
                } else {
                    0.0
                };
                data.push(rain);
            }
        }
    }
    data
}

fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Evenly spaced coordinate axis: `start, start + step, ...` (`n` values).
pub fn regular_axis(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Packs physical values into raw integers for a `scale_factor` /
/// `add_offset` encoding. NaN becomes `fill`.
pub fn pack_values(values: &[f64], scale_factor: f64, add_offset: f64, fill: f64) -> Vec<f64> {
    values
        .iter()
        .map(|v| {
            if v.is_nan() {
                fill
            } else {
                ((v - add_offset) / scale_factor).round()
            }
        })
        .collect()
}
