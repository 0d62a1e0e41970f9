use crate::geometry::{quantize, Coord, Finger};

/// An ordered sequence of key presses reduced to (finger, coordinate) pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nstroke<const N: usize> {
    pub fingers: [Finger; N],
    pub coords: [Coord; N],
}

pub type Bistroke = Nstroke<2>;
pub type Tristroke = Nstroke<3>;

/// Canonical form of a stroke under per-hand horizontal translation.
///
/// Each hand's keys are shifted so the leftmost key of that hand sits at
/// x = 0, then quantized. Two strokes share a shape exactly when one can be
/// turned into the other by sliding each hand sideways independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrokeShape<const N: usize> {
    pub fingers: [Finger; N],
    pub coords: [(i64, i64); N],
}

impl<const N: usize> Nstroke<N> {
    pub fn new(fingers: [Finger; N], coords: [Coord; N]) -> Self {
        Self { fingers, coords }
    }

    pub fn has_unknown(&self) -> bool {
        self.fingers.iter().any(|f| !f.is_known())
    }

    pub fn shape(&self) -> StrokeShape<N> {
        let mut min_left = f64::INFINITY;
        let mut min_right = f64::INFINITY;
        for (f, c) in self.fingers.iter().zip(self.coords.iter()) {
            if f.is_right() {
                min_right = min_right.min(c.x);
            } else {
                min_left = min_left.min(c.x);
            }
        }

        let mut coords = [(0i64, 0i64); N];
        for i in 0..N {
            let origin = if self.fingers[i].is_right() {
                min_right
            } else {
                min_left
            };
            coords[i] = (
                quantize(self.coords[i].x - origin),
                quantize(self.coords[i].y),
            );
        }

        StrokeShape {
            fingers: self.fingers,
            coords,
        }
    }
}

impl Tristroke {
    /// The sub-stroke made of presses `i` and `j`.
    pub fn bistroke(&self, i: usize, j: usize) -> Bistroke {
        Bistroke {
            fingers: [self.fingers[i], self.fingers[j]],
            coords: [self.coords[i], self.coords[j]],
        }
    }
}

/// True when `b` equals `a` after some per-hand horizontal offset.
pub fn compatible<const N: usize>(a: &Nstroke<N>, b: &Nstroke<N>) -> bool {
    a.shape() == b.shape()
}
