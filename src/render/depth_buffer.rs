/// Per-pixel nearest depth for one frame. Cleared to +infinity; a pixel accepts a new
/// sample only when it is strictly nearer than the stored one.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthBuffer {
    width: usize,
    height: usize,
    depths: Vec<f64>,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            depths: vec![f64::INFINITY; width * height],
        }
    }

    pub fn clear(&mut self) {
        self.depths.fill(f64::INFINITY);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn depth_at(&self, x: usize, y: usize) -> f64 {
        self.depths[y * self.width + x]
    }

    pub fn depths_mut(&mut self) -> &mut [f64] {
        &mut self.depths
    }

    /// Records `depth` at `(x, y)` if it is nearer than what is stored there.
    pub fn test_and_set(&mut self, x: usize, y: usize, depth: f64) -> bool {
        test_and_set(&mut self.depths[y * self.width + x], depth)
    }
}

/// Depth test on a single stored value.
pub fn test_and_set(stored: &mut f64, depth: f64) -> bool {
    if depth < *stored {
        *stored = depth;
        true
    } else {
        false
    }
}
