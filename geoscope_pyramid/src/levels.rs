// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use smallvec::SmallVec;

/// One resolution level of a raster pyramid, identified by its downsampling factor.
///
/// Factor `1` is the full-resolution raster; factor `4` is an overview with a
/// quarter of the pixels along each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PyramidLevel {
    factor: u32,
}

impl PyramidLevel {
    /// The full-resolution level.
    pub const FULL: Self = Self { factor: 1 };

    /// Creates a level for the given downsampling factor.
    ///
    /// Returns `None` for a zero factor.
    #[must_use]
    pub const fn new(factor: u32) -> Option<Self> {
        if factor == 0 {
            None
        } else {
            Some(Self { factor })
        }
    }

    /// Returns the downsampling factor.
    #[must_use]
    pub const fn factor(self) -> u32 {
        self.factor
    }

    /// Returns `true` for the full-resolution level.
    #[must_use]
    pub const fn is_full_resolution(self) -> bool {
        self.factor == 1
    }

    /// Number of level pixels needed to cover `len` full-resolution pixels.
    #[must_use]
    pub const fn decoded_len(self, len: u32) -> u32 {
        len.div_ceil(self.factor)
    }
}

impl Default for PyramidLevel {
    fn default() -> Self {
        Self::FULL
    }
}

/// The declared levels of a raster pyramid.
///
/// The list is always strictly ascending by factor and always contains the
/// full-resolution level, so [`PyramidLevels::finest`] never fails.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PyramidLevels {
    levels: SmallVec<[PyramidLevel; 8]>,
}

impl PyramidLevels {
    /// Overview factors built on top of the full-resolution level by default.
    pub const DEFAULT_OVERVIEW_FACTORS: [u32; 4] = [2, 4, 8, 16];

    /// Builds a level list from downsampling factors.
    ///
    /// Zero factors are dropped, duplicates are merged, and factor `1` is
    /// always present.
    #[must_use]
    pub fn from_factors(factors: impl IntoIterator<Item = u32>) -> Self {
        let mut levels: SmallVec<[PyramidLevel; 8]> = SmallVec::new();
        levels.push(PyramidLevel::FULL);
        levels.extend(factors.into_iter().filter_map(PyramidLevel::new));
        levels.sort_unstable();
        levels.dedup();
        Self { levels }
    }

    /// A pyramid with only the full-resolution level.
    #[must_use]
    pub fn full_resolution_only() -> Self {
        Self::from_factors([])
    }

    /// Number of levels, including full resolution.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always `false`; the full-resolution level is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Iterates levels from finest to coarsest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = PyramidLevel> + '_ {
        self.levels.iter().copied()
    }

    /// Returns the level at `index`, where `0` is full resolution.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<PyramidLevel> {
        self.levels.get(index).copied()
    }

    /// Returns the position of `level` in the list, if declared.
    #[must_use]
    pub fn index_of(&self, level: PyramidLevel) -> Option<usize> {
        self.levels.binary_search(&level).ok()
    }

    /// Returns `true` if `level` is one of the declared levels.
    #[must_use]
    pub fn contains(&self, level: PyramidLevel) -> bool {
        self.index_of(level).is_some()
    }

    /// The full-resolution level.
    #[must_use]
    pub fn finest(&self) -> PyramidLevel {
        PyramidLevel::FULL
    }

    /// The most downsampled level.
    #[must_use]
    pub fn coarsest(&self) -> PyramidLevel {
        self.levels.last().copied().unwrap_or(PyramidLevel::FULL)
    }

    /// Keeps only the levels whose factor is in `factors`.
    ///
    /// Full resolution always survives, so restricting to nothing yields
    /// [`PyramidLevels::full_resolution_only`].
    #[must_use]
    pub fn restricted_to(&self, factors: &[u32]) -> Self {
        Self::from_factors(
            self.overview_factors()
                .filter(|factor| factors.contains(factor)),
        )
    }

    /// Overview factors, excluding full resolution.
    pub fn overview_factors(&self) -> impl Iterator<Item = u32> + '_ {
        self.iter()
            .filter(|level| !level.is_full_resolution())
            .map(PyramidLevel::factor)
    }
}

impl Default for PyramidLevels {
    fn default() -> Self {
        Self::from_factors(Self::DEFAULT_OVERVIEW_FACTORS)
    }
}
