//! Geographic coordinate type, spatial utilities, and route polylines.
//!
//! `GeoPoint` stores `f32` latitude/longitude (~1 m at the equator).

/// A WGS-84 geographic coordinate stored as single-precision floats.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f32,
    pub lon: f32,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f32, lon: f32) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    ///
    /// Accuracy: ±0.5 % (f32 rounding); suitable for edge weights and the
    /// walk-threshold check at city scale.
    pub fn distance_m(self, other: GeoPoint) -> f32 {
        const R: f32 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// Linear blend in lat/lon space; `t = 0` → `self`, `t = 1` → `other`.
    #[inline]
    pub fn lerp(self, other: GeoPoint, t: f32) -> GeoPoint {
        GeoPoint {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── Polyline ──────────────────────────────────────────────────────────────────

/// An ordered list of points with precomputed cumulative lengths.
///
/// Consecutive duplicate points are removed at construction so every stored
/// leg has non-negative length and `point_at_fraction` never divides by zero
/// on a degenerate leg.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polyline {
    points: Vec<GeoPoint>,
    /// `cumulative_m[i]` = length from `points[0]` to `points[i]`.
    cumulative_m: Vec<f32>,
}

impl Polyline {
    pub fn new(points: impl IntoIterator<Item = GeoPoint>) -> Self {
        let mut deduped: Vec<GeoPoint> = Vec::new();
        for p in points {
            if deduped.last() != Some(&p) {
                deduped.push(p);
            }
        }

        let mut cumulative_m = Vec::with_capacity(deduped.len());
        let mut acc = 0.0_f32;
        for (i, p) in deduped.iter().enumerate() {
            if i > 0 {
                acc += deduped[i - 1].distance_m(*p);
            }
            cumulative_m.push(acc);
        }
        Self { points: deduped, cumulative_m }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn length_m(&self) -> f32 {
        self.cumulative_m.last().copied().unwrap_or(0.0)
    }

    pub fn start(&self) -> Option<GeoPoint> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<GeoPoint> {
        self.points.last().copied()
    }

    /// Point at `fraction` of the total length (clamped to `[0, 1]`).
    ///
    /// The end points are returned exactly (no interpolation drift) for
    /// fractions `<= 0` and `>= 1`.  Returns `None` only for an empty line.
    pub fn point_at_fraction(&self, fraction: f32) -> Option<GeoPoint> {
        let first = *self.points.first()?;
        let last = *self.points.last()?;
        let total = self.length_m();
        if fraction <= 0.0 || total <= 0.0 {
            return Some(first);
        }
        if fraction >= 1.0 {
            return Some(last);
        }

        let target = fraction * total;
        // First index whose cumulative length exceeds the target; the leg is
        // [idx - 1, idx].
        let idx = self.cumulative_m.partition_point(|&c| c <= target);
        if idx == 0 {
            return Some(first);
        }
        if idx >= self.points.len() {
            return Some(last);
        }
        let leg_start = self.cumulative_m[idx - 1];
        let leg_len = self.cumulative_m[idx] - leg_start;
        let t = if leg_len > 0.0 { (target - leg_start) / leg_len } else { 0.0 };
        Some(self.points[idx - 1].lerp(self.points[idx], t))
    }
}

/// Well-Known-Text `LINESTRING(lon lat, …)` for a point slice, the format
/// downstream GIS tools read directly.
pub fn wkt_linestring(points: &[GeoPoint]) -> String {
    let coords: Vec<String> = points
        .iter()
        .map(|p| format!("{:.6} {:.6}", p.lon, p.lat))
        .collect();
    format!("LINESTRING({})", coords.join(", "))
}
