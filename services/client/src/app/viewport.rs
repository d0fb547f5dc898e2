//! services/client/src/app/viewport.rs
//!
//! Map framing for a set of plotted destinations.

use ridetribe_core::domain::Geo;

/// Zoom used when there is a single point to show.
pub const SINGLE_POINT_ZOOM: u8 = 14;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: Geo,
    pub north_east: Geo,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Viewport {
    /// Centre on one point at a fixed zoom.
    Centered { center: Geo, zoom: u8 },
    /// Fit the map to a box containing every point.
    Fitted { center: Geo, bounds: Bounds },
}

impl Viewport {
    /// Frames every point. Returns `None` when there is nothing to show.
    pub fn fit<I>(points: I) -> Option<Viewport>
    where
        I: IntoIterator<Item = Geo>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;

        let mut bounds = Bounds {
            south_west: first,
            north_east: first,
        };
        let mut count = 1usize;
        for p in points {
            bounds.south_west.lat = bounds.south_west.lat.min(p.lat);
            bounds.south_west.lng = bounds.south_west.lng.min(p.lng);
            bounds.north_east.lat = bounds.north_east.lat.max(p.lat);
            bounds.north_east.lng = bounds.north_east.lng.max(p.lng);
            count += 1;
        }

        if count == 1 {
            return Some(Viewport::Centered {
                center: first,
                zoom: SINGLE_POINT_ZOOM,
            });
        }
        Some(Viewport::Fitted {
            center: bounds.center(),
            bounds,
        })
    }

    pub fn center(&self) -> Geo {
        match self {
            Viewport::Centered { center, .. } | Viewport::Fitted { center, .. } => *center,
        }
    }
}

impl Bounds {
    pub fn center(&self) -> Geo {
        Geo {
            lat: (self.south_west.lat + self.north_east.lat) / 2.0,
            lng: (self.south_west.lng + self.north_east.lng) / 2.0,
        }
    }

    pub fn contains(&self, p: Geo) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&p.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&p.lng)
    }
}
