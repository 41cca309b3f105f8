/// Integer position in either viewport or mask space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl From<[u32; 2]> for Size {
    fn from([width, height]: [u32; 2]) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub min: Point,
    pub size: Size,
}

impl Rect {
    pub const fn from_min_size(min: Point, size: Size) -> Self {
        Self { min, size }
    }

    /// Places `inner` in the middle of `viewport`. Offsets become negative if
    /// the viewport is smaller than `inner`.
    pub fn centered(viewport: Size, inner: Size) -> Self {
        let x = (viewport.width as i32 - inner.width as i32).div_euclid(2);
        let y = (viewport.height as i32 - inner.height as i32).div_euclid(2);
        Self::from_min_size(Point::new(x, y), inner)
    }

    /// Viewport position translated into the coordinate system of this rect.
    pub fn to_local(&self, viewport_pos: Point) -> Point {
        viewport_pos - self.min
    }

    pub fn contains(&self, p: Point) -> bool {
        let local = self.to_local(p);
        local.x >= 0
            && local.y >= 0
            && (local.x as u32) < self.size.width
            && (local.y as u32) < self.size.height
    }
}
