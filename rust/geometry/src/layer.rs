// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layer-keyed element collections
//!
//! A [`LayerMap`] is owned by exactly one pipeline stage at a time. Stages
//! consume it and build a new one, so no stage mutates another's output.

use crate::element::Element2D;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// Layer identifier
pub type LayerId = i32;

/// Mapping from layer id to that layer's ordered elements
#[derive(Debug, Clone, PartialEq)]
pub struct LayerMap<T> {
    layers: BTreeMap<LayerId, Vec<T>>,
}

impl<T> LayerMap<T> {
    pub fn new() -> Self {
        Self {
            layers: BTreeMap::new(),
        }
    }

    /// Replace the element list of `layer`
    pub fn insert(&mut self, layer: LayerId, elements: Vec<T>) {
        self.layers.insert(layer, elements);
    }

    /// Append one element to `layer`, creating the layer if needed
    pub fn push(&mut self, layer: LayerId, element: T) {
        self.layers.entry(layer).or_default().push(element);
    }

    pub fn get(&self, layer: LayerId) -> Option<&[T]> {
        self.layers.get(&layer).map(Vec::as_slice)
    }

    pub fn remove(&mut self, layer: LayerId) -> Option<Vec<T>> {
        self.layers.remove(&layer)
    }

    /// Layer ids in ascending order
    pub fn layer_ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.keys().copied()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Total number of elements across all layers
    pub fn element_count(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &[T])> + '_ {
        self.layers.iter().map(|(&id, elements)| (id, elements.as_slice()))
    }

    /// Transform every layer's element list, producing a new map
    pub fn map_layers<U, F>(self, mut f: F) -> LayerMap<U>
    where
        F: FnMut(LayerId, Vec<T>) -> Vec<U>,
    {
        LayerMap {
            layers: self
                .layers
                .into_iter()
                .map(|(id, elements)| (id, f(id, elements)))
                .collect(),
        }
    }
}

impl<T> Default for LayerMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntoIterator for LayerMap<T> {
    type Item = (LayerId, Vec<T>);
    type IntoIter = btree_map::IntoIter<LayerId, Vec<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.into_iter()
    }
}

impl<T> FromIterator<(LayerId, Vec<T>)> for LayerMap<T> {
    fn from_iter<I: IntoIterator<Item = (LayerId, Vec<T>)>>(iter: I) -> Self {
        Self {
            layers: iter.into_iter().collect(),
        }
    }
}

/// Debug dump of a 2D layer map:
///
/// ```text
/// layers = {
///   6 : [
///     ([[0, 0], [1, 0], [0, 1]], [[0, 1, 2]], false)
///   ]
/// }
/// ```
impl fmt::Display for LayerMap<Element2D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "layers = {{")?;
        let layer_count = self.layers.len();
        for (li, (layer, elements)) in self.layers.iter().enumerate() {
            writeln!(f, "  {} : [", layer)?;
            for (ei, element) in elements.iter().enumerate() {
                write!(f, "    ([")?;
                for (vi, v) in element.polygon.iter().enumerate() {
                    if vi > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[{}, {}]", v.x, v.y)?;
                }
                write!(f, "], [")?;
                for (ti, t) in element.triangles.iter().enumerate() {
                    if ti > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", t)?;
                }
                write!(f, "], {})", element.reversed)?;
                if ei + 1 < elements.len() {
                    write!(f, ",")?;
                }
                writeln!(f)?;
            }
            write!(f, "  ]")?;
            if li + 1 < layer_count {
                write!(f, ",")?;
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}
