use serde::{Deserialize, Serialize};

/// Lon/lat extent in the order MapLibre and STAC use: [minx, miny, maxx, maxy]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 4]", from = "[f64; 4]")]
pub struct Bounds {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Bounds {
    /// Reduce a STAC `bbox` to 2D. Six elements are
    /// `[minx, miny, minz, maxx, maxy, maxz]`; anything that is neither 4 nor 6
    /// long is unusable.
    pub fn from_stac_bbox(bbox: &[f64]) -> Option<Self> {
        match bbox {
            [minx, miny, maxx, maxy] => Some(Bounds::from((*minx, *miny, *maxx, *maxy))),
            [minx, miny, _, maxx, maxy, _] => Some(Bounds::from((*minx, *miny, *maxx, *maxy))),
            _ => None,
        }
    }

    /// Fold a sequence of positions into their extent. `None` when empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        points.into_iter().fold(None, |acc, (x, y)| match acc {
            None => Some(Bounds::from((x, y, x, y))),
            Some(mut b) => {
                b.extend(x, y);
                Some(b)
            }
        })
    }

    pub fn extend(&mut self, x: f64, y: f64) {
        self.minx = self.minx.min(x);
        self.miny = self.miny.min(y);
        self.maxx = self.maxx.max(x);
        self.maxy = self.maxy.max(y);
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.minx && x <= self.maxx && y >= self.miny && y <= self.maxy
    }

    /// South-west and north-east corners, as `fitBounds` takes them
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.minx, self.miny], [self.maxx, self.maxy]]
    }
}

impl From<(f64, f64, f64, f64)> for Bounds {
    fn from(extent: (f64, f64, f64, f64)) -> Self {
        Bounds {
            minx: extent.0,
            miny: extent.1,
            maxx: extent.2,
            maxy: extent.3,
        }
    }
}

impl From<[f64; 4]> for Bounds {
    fn from(b: [f64; 4]) -> Self {
        Bounds::from((b[0], b[1], b[2], b[3]))
    }
}

impl From<Bounds> for [f64; 4] {
    fn from(b: Bounds) -> Self {
        [b.minx, b.miny, b.maxx, b.maxy]
    }
}
