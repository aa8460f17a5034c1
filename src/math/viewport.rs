//! Integer pixel viewport rectangle

/// Pixel rectangle `{x, y, w, h}`; zero width or height means no area
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelViewport {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl PixelViewport {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn has_area(&self) -> bool {
        self.w > 0 && self.h > 0
    }

    pub fn area(&self) -> usize {
        if self.has_area() { self.w as usize * self.h as usize } else { 0 }
    }

    pub fn x_end(&self) -> i32 {
        self.x + self.w
    }

    pub fn y_end(&self) -> i32 {
        self.y + self.h
    }

    /// Grow to the bounding rectangle of both; an empty viewport adopts `other`
    pub fn merge(&mut self, other: &PixelViewport) {
        if !other.has_area() {
            return;
        }
        if !self.has_area() {
            *self = *other;
            return;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let x_end = self.x_end().max(other.x_end());
        let y_end = self.y_end().max(other.y_end());
        *self = Self::new(x, y, x_end - x, y_end - y);
    }

    /// Clip to the overlap with `other`; disjoint rectangles collapse to no area
    pub fn intersect(&mut self, other: &PixelViewport) {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let x_end = self.x_end().min(other.x_end());
        let y_end = self.y_end().min(other.y_end());
        *self = Self::new(x, y, (x_end - x).max(0), (y_end - y).max(0));
    }

    pub fn intersection(&self, other: &PixelViewport) -> PixelViewport {
        let mut r = *self;
        r.intersect(other);
        r
    }

    /// Shift by an integer offset
    pub fn offset(&self, dx: i32, dy: i32) -> PixelViewport {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_empty_adopts_other() {
        let mut pvp = PixelViewport::default();
        pvp.merge(&PixelViewport::new(2, 3, 4, 5));
        assert_eq!(pvp, PixelViewport::new(2, 3, 4, 5));
    }

    #[test]
    fn test_merge_union() {
        let mut pvp = PixelViewport::new(0, 0, 10, 10);
        pvp.merge(&PixelViewport::new(5, 5, 10, 10));
        assert_eq!(pvp, PixelViewport::new(0, 0, 15, 15));
    }

    #[test]
    fn test_intersect() {
        let mut pvp = PixelViewport::new(0, 0, 10, 10);
        pvp.intersect(&PixelViewport::new(5, -5, 10, 10));
        assert_eq!(pvp, PixelViewport::new(5, 0, 5, 5));

        let mut disjoint = PixelViewport::new(0, 0, 4, 4);
        disjoint.intersect(&PixelViewport::new(10, 10, 4, 4));
        assert!(!disjoint.has_area());
    }
}
