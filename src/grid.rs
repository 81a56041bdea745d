/// Row-major flat grid. No per-cell objects.
///
/// For the petal surface `x` is the angular step and `y` the radial step, so
/// each row is one ring of the flower. The rasterizer uses the same type for
/// its depth buffer with `x`/`y` in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub w: usize,
    pub h: usize,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, T::default())
    }

    pub fn filled(w: usize, h: usize, v: T) -> Self {
        Self {
            data: vec![v; w * h],
            w,
            h,
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.w && y < self.h);
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: T) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Resize in place, keeping the contents when the dimensions match.
    pub fn reshape(&mut self, w: usize, h: usize) {
        if self.w != w || self.h != h {
            self.data.clear();
            self.data.resize(w * h, T::default());
            self.w = w;
            self.h = h;
        }
    }

    pub fn row(&self, y: usize) -> &[T] {
        &self.data[y * self.w..(y + 1) * self.w]
    }
}
