// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Routing lists attached to messages that pass through other engines
//! before settling at the director.

use crate::settings::Settings;

/// A destination tag an in-transit message can be addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineType {
    /// Minimal inductive-validity-core reduction
    IvcReduction,
    /// All-cores enumeration
    IvcReductionAll,
    /// Counterexample smoothing
    Smoothing,
}

/// An immutable, ordered list of destinations still ahead of a message.
///
/// Handling a message whose `next_destination` is non-empty must forward
/// it (with [`Itinerary::advanced`]) rather than treat it as a verdict.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Itinerary {
    destinations: Vec<EngineType>,
}

impl Itinerary {
    /// An itinerary that makes its message terminal immediately.
    pub fn empty() -> Self {
        Itinerary::default()
    }

    /// An itinerary visiting the given destinations in order.
    pub fn new(destinations: Vec<EngineType>) -> Self {
        Itinerary { destinations }
    }

    /// The next destination, without consuming it.
    pub fn next_destination(&self) -> Option<EngineType> {
        self.destinations.first().copied()
    }

    /// The itinerary after the current destination has done its work.
    pub fn advanced(&self) -> Itinerary {
        Itinerary {
            destinations: self.destinations.iter().skip(1).copied().collect(),
        }
    }
}

/// The route a valid verdict takes before settling: core reduction, then
/// core enumeration, as configured.
pub fn valid_itinerary(settings: &Settings) -> Itinerary {
    let mut destinations = Vec::new();
    if settings.reduce_ivc {
        destinations.push(EngineType::IvcReduction);
    }
    if settings.all_ivcs {
        destinations.push(EngineType::IvcReductionAll);
    }
    Itinerary::new(destinations)
}

/// The route an invalid verdict takes before settling: smoothing, if
/// configured.
pub fn invalid_itinerary(settings: &Settings) -> Itinerary {
    let mut destinations = Vec::new();
    if settings.smooth_counterexamples {
        destinations.push(EngineType::Smoothing);
    }
    Itinerary::new(destinations)
}
