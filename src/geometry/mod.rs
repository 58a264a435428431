use std::fmt;
use std::ops::Sub;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: Copy + Sub<Output = T>> Interval<T> {
    pub fn range(&self) -> T {
        self.max - self.min
    }
}

impl<T: Copy + PartialOrd> Interval<T> {
    pub fn contains_interval(&self, other: &Interval<T>) -> bool {
        self.min <= other.min && other.max <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region<T> {
    pub x: Interval<T>,
    pub y: Interval<T>,
}

/// Geographic rectangle in the units of a pyramid's reference system.
pub type Envelope = Region<f64>;

impl<T> Region<T> {
    pub fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            x: Interval::new(min_x, max_x),
            y: Interval::new(min_y, max_y),
        }
    }
}

impl<T: Copy> Region<T> {
    /// (min_x, min_y, max_x, max_y)
    pub fn as_tuple(&self) -> (T, T, T, T) {
        (self.x.min, self.y.min, self.x.max, self.y.max)
    }

    pub fn x_min(&self) -> T {
        self.x.min
    }

    pub fn y_min(&self) -> T {
        self.y.min
    }

    pub fn x_max(&self) -> T {
        self.x.max
    }

    pub fn y_max(&self) -> T {
        self.y.max
    }
}

impl<T: Copy + PartialOrd> Region<T> {
    pub fn contains(&self, other: &Region<T>) -> bool {
        self.x.contains_interval(&other.x) && self.y.contains_interval(&other.y)
    }
}

impl Region<f64> {
    /// Normalizes corner order so that min <= max on both axes.
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }

    pub fn width(&self) -> f64 {
        self.x.range()
    }

    pub fn height(&self) -> f64 {
        self.y.range()
    }

    pub fn is_finite(&self) -> bool {
        self.x.min.is_finite()
            && self.x.max.is_finite()
            && self.y.min.is_finite()
            && self.y.max.is_finite()
    }
}

impl<T: fmt::Display> fmt::Display for Region<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] x [{}, {}]",
            self.x.min, self.x.max, self.y.min, self.y.max
        )
    }
}
