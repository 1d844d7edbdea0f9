//! Max-wins aggregation of crossing slopes per station.

use std::collections::BTreeMap;

use crate::core::scan::StationKey;

use super::classify::RegionTag;

/// Sorted `(station, slope)` pairs for one region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSeries {
    points: Vec<(StationKey, f64)>,
}

impl AggregateSeries {
    #[inline]
    pub fn points(&self) -> &[(StationKey, f64)] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(StationKey, f64)> {
        self.points.iter()
    }

    /// Slope stored for `station`, if any.
    pub fn get(&self, station: &StationKey) -> Option<f64> {
        self.points
            .binary_search_by(|(key, _)| key.cmp(station))
            .ok()
            .map(|i| self.points[i].1)
    }
}

impl From<BTreeMap<StationKey, f64>> for AggregateSeries {
    fn from(map: BTreeMap<StationKey, f64>) -> Self {
        Self {
            points: map.into_iter().collect(),
        }
    }
}

/// The two finished series of a pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedSlopes {
    pub region_a: AggregateSeries,
    pub region_b: AggregateSeries,
}

/// Keeps the largest slope magnitude seen per station for each region.
#[derive(Debug, Clone, Default)]
pub struct SlopeAggregator {
    region_a: BTreeMap<StationKey, f64>,
    region_b: BTreeMap<StationKey, f64>,
}

impl SlopeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a slope for `station` in `region`.
    ///
    /// The magnitude is stored when the station is new or the magnitude is
    /// strictly larger than the stored one. Ties keep the first value.
    /// Returns true when the stored value changed. Regions that do not
    /// aggregate, and NaN slopes, are ignored.
    pub fn offer(&mut self, station: &StationKey, region: RegionTag, slope: f64) -> bool {
        let map = match region {
            RegionTag::RegionA => &mut self.region_a,
            RegionTag::RegionB => &mut self.region_b,
            RegionTag::Neutral | RegionTag::Unclassified => return false,
        };

        let magnitude = slope.abs();
        if magnitude.is_nan() {
            return false;
        }

        match map.get_mut(station) {
            Some(stored) if magnitude > *stored => {
                *stored = magnitude;
                true
            }
            Some(_) => false,
            None => {
                map.insert(station.clone(), magnitude);
                true
            }
        }
    }

    /// Number of stations currently held for `region`.
    pub fn station_count(&self, region: RegionTag) -> usize {
        match region {
            RegionTag::RegionA => self.region_a.len(),
            RegionTag::RegionB => self.region_b.len(),
            RegionTag::Neutral | RegionTag::Unclassified => 0,
        }
    }

    /// Materialise both series sorted ascending by station.
    pub fn finish(self) -> AggregatedSlopes {
        AggregatedSlopes {
            region_a: self.region_a.into(),
            region_b: self.region_b.into(),
        }
    }
}
