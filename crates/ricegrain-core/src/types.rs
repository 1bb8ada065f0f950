//! Core types for Ricegrain

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Number of morphological measurements per grain
pub const FEATURE_COUNT: usize = 7;

/// Column names in the fixed order every classifier expects
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Area",
    "Perimeter",
    "MajorAxisLength",
    "MinorAxisLength",
    "Eccentricity",
    "ConvexArea",
    "Extent",
];

/// Tolerance used when checking that a probability pair sums to one
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Morphological measurements of a single rice grain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeatureVector {
    pub area: f64,
    pub perimeter: f64,
    pub major_axis_length: f64,
    pub minor_axis_length: f64,
    /// Conventionally within [0, 1]
    pub eccentricity: f64,
    pub convex_area: f64,
    /// Conventionally within [0, 1]
    pub extent: f64,
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            area: 12000.0,
            perimeter: 400.0,
            major_axis_length: 200.0,
            minor_axis_length: 100.0,
            eccentricity: 0.8,
            convex_area: 12500.0,
            extent: 0.75,
        }
    }
}

impl FeatureVector {
    /// Build a vector from values in [`FEATURE_NAMES`] order
    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        let [area, perimeter, major_axis_length, minor_axis_length, eccentricity, convex_area, extent] =
            values;
        Self {
            area,
            perimeter,
            major_axis_length,
            minor_axis_length,
            eccentricity,
            convex_area,
            extent,
        }
    }

    /// Build a vector from a slice, rejecting anything but exactly seven values
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let array: [f64; FEATURE_COUNT] = values.try_into().map_err(|_| {
            Error::invalid_input(format!(
                "expected {} feature values, got {}",
                FEATURE_COUNT,
                values.len()
            ))
        })?;
        Ok(Self::from_array(array))
    }

    /// Values in [`FEATURE_NAMES`] order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.area,
            self.perimeter,
            self.major_axis_length,
            self.minor_axis_length,
            self.eccentricity,
            self.convex_area,
            self.extent,
        ]
    }

    /// Check the measurements against the accepted ranges.
    ///
    /// Every value must be finite and non-negative. Eccentricity and Extent
    /// above 1 are clamped when `clamp_unit_range` is set and rejected
    /// otherwise.
    pub fn validated(mut self, clamp_unit_range: bool) -> Result<Self> {
        for (name, value) in FEATURE_NAMES.iter().zip(self.to_array()) {
            if !value.is_finite() {
                return Err(Error::invalid_input(format!("{} must be a finite number", name)));
            }
            if value < 0.0 {
                return Err(Error::invalid_input(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }

        for (name, value) in [
            ("Eccentricity", &mut self.eccentricity),
            ("Extent", &mut self.extent),
        ] {
            if *value > 1.0 {
                if clamp_unit_range {
                    *value = 1.0;
                } else {
                    return Err(Error::invalid_input(format!(
                        "{} must be within [0, 1], got {}",
                        name, value
                    )));
                }
            }
        }

        Ok(self)
    }
}

/// Feature input as accepted at the application boundary.
///
/// Callers either send a raw ordered array or named columns; both adapt to a
/// single [`FeatureVector`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureInput {
    /// `{"features": [area, perimeter, ...]}` in [`FEATURE_NAMES`] order
    Raw { features: Vec<f64> },
    /// `{"Area": .., "Perimeter": .., ...}`
    Named(FeatureVector),
}

impl FeatureInput {
    /// Adapt either calling convention to a typed vector
    pub fn into_features(self) -> Result<FeatureVector> {
        match self {
            Self::Raw { features } => FeatureVector::from_slice(&features),
            Self::Named(features) => Ok(features),
        }
    }
}

/// The two rice varieties the classifier distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiceClass {
    /// Class label 0
    Cammeo,
    /// Class label 1
    Osmancik,
}

impl RiceClass {
    /// Numeric class label used by classifiers
    pub fn index(self) -> usize {
        match self {
            Self::Cammeo => 0,
            Self::Osmancik => 1,
        }
    }

    /// Map a numeric class label back to a variety
    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(Self::Cammeo),
            1 => Ok(Self::Osmancik),
            other => Err(Error::prediction(format!("unknown class label {}", other))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cammeo => "Cammeo",
            Self::Osmancik => "Osmancik",
        }
    }
}

impl fmt::Display for RiceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability pair produced by a classifier for one grain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProbabilityPair")]
pub struct ClassProbabilities {
    cammeo: f64,
    osmancik: f64,
}

/// Unchecked wire form of [`ClassProbabilities`]
#[derive(Deserialize)]
struct ProbabilityPair {
    cammeo: f64,
    osmancik: f64,
}

impl TryFrom<ProbabilityPair> for ClassProbabilities {
    type Error = Error;

    fn try_from(pair: ProbabilityPair) -> Result<Self> {
        Self::new(pair.cammeo, pair.osmancik)
    }
}

impl ClassProbabilities {
    /// Create a probability pair, checking it is a distribution
    pub fn new(cammeo: f64, osmancik: f64) -> Result<Self> {
        if !(cammeo.is_finite() && osmancik.is_finite()) || cammeo < 0.0 || osmancik < 0.0 {
            return Err(Error::prediction(format!(
                "probabilities must be finite and non-negative, got ({}, {})",
                cammeo, osmancik
            )));
        }
        if ((cammeo + osmancik) - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(Error::prediction(format!(
                "probabilities must sum to 1, got ({}, {})",
                cammeo, osmancik
            )));
        }
        Ok(Self { cammeo, osmancik })
    }

    /// Probability of class 0
    pub fn cammeo(&self) -> f64 {
        self.cammeo
    }

    /// Probability of class 1
    pub fn osmancik(&self) -> f64 {
        self.osmancik
    }

    pub fn get(&self, class: RiceClass) -> f64 {
        match class {
            RiceClass::Cammeo => self.cammeo,
            RiceClass::Osmancik => self.osmancik,
        }
    }

    /// `(p0, p1)`
    pub fn as_pair(&self) -> (f64, f64) {
        (self.cammeo, self.osmancik)
    }
}

/// Label shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Cammeo,
    Osmancik,
    /// Only produced by threshold-gated decisions
    Uncertain,
}

impl Label {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cammeo => "Cammeo",
            Self::Osmancik => "Osmancik",
            Self::Uncertain => "Uncertain",
        }
    }
}

impl From<RiceClass> for Label {
    fn from(class: RiceClass) -> Self {
        match class {
            RiceClass::Cammeo => Self::Cammeo,
            RiceClass::Osmancik => Self::Osmancik,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
