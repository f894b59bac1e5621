// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! An opened calculation: its summary, revenue units and the week's deductions.

use crate::api::{self, ApiError, Backend};
use crate::deductions::fetch_deductions_for_view;
use crate::display::{CalculationSummary, DeductionRow, RevenueRow, TruckMap, revenue_rows};
use crate::models::{CalculationUnit, CalculationView, RecordId};
use serde::Serialize;
use std::thread;
use tracing::{debug, error, info, warn};

/// Identifies the view and refresh a fetch was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    view: String,
    generation: u64,
}

/// Working state of the open view. Results carrying a ticket from an
/// earlier view or refresh are dropped.
#[derive(Debug, Default)]
pub struct ViewSession {
    current: Option<String>,
    generation: u64,
    deductions: Vec<CalculationUnit>,
    trucks: TruckMap,
}

impl ViewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, view: &CalculationView) -> Ticket {
        self.generation += 1;
        self.current = Some(view.key());
        self.deductions.clear();
        self.trucks = TruckMap::default();
        Ticket {
            view: view.key(),
            generation: self.generation,
        }
    }

    /// New ticket for the same view; outstanding fetches become stale.
    pub fn refresh(&mut self) -> Option<Ticket> {
        let view = self.current.clone()?;
        self.generation += 1;
        Some(Ticket {
            view,
            generation: self.generation,
        })
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.current.as_deref() == Some(ticket.view.as_str()) && self.generation == ticket.generation
    }

    pub fn accept_deductions(&mut self, ticket: &Ticket, deductions: Vec<CalculationUnit>) -> bool {
        if !self.is_current(ticket) {
            debug!(view = %ticket.view, generation = ticket.generation, "dropping stale deductions");
            return false;
        }
        self.deductions = deductions;
        true
    }

    /// Trucks do not change between refreshes, so only the view must match.
    pub fn accept_trucks(&mut self, ticket: &Ticket, trucks: TruckMap) -> bool {
        if self.current.as_deref() != Some(ticket.view.as_str()) {
            debug!(view = %ticket.view, "dropping stale truck list");
            return false;
        }
        self.trucks = trucks;
        true
    }

    pub fn remove_deduction(&mut self, id: &RecordId) {
        self.deductions.retain(|d| d.id.as_ref() != Some(id));
    }

    pub fn deductions(&self) -> &[CalculationUnit] {
        &self.deductions
    }

    pub fn trucks(&self) -> &TruckMap {
        &self.trucks
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewReport {
    pub summary: CalculationSummary,
    pub revenue: Vec<RevenueRow>,
    pub deductions: Vec<DeductionRow>,
}

pub fn report(session: &ViewSession, view: &CalculationView) -> ViewReport {
    ViewReport {
        summary: CalculationSummary::build(view),
        revenue: revenue_rows(view),
        deductions: session
            .deductions()
            .iter()
            .map(|d| DeductionRow::build(d, session.trucks()))
            .collect(),
    }
}

fn fetch_truck_map(api: &dyn Backend) -> TruckMap {
    match api::fetch_trucks(api) {
        Ok(list) => {
            let map = TruckMap::from_list(list);
            if map.is_empty() {
                warn!("truck list is empty, deductions show truck ids only");
            } else {
                debug!(trucks = map.len(), "truck map built");
            }
            map
        }
        Err(e) => {
            error!(error = %e, "fetching trucks failed");
            TruckMap::default()
        }
    }
}

/// Open `view`: trucks and deductions are fetched side by side.
pub fn open_view(api: &dyn Backend, session: &mut ViewSession, view: &CalculationView) -> ViewReport {
    let ticket = session.open(view);

    let (trucks, deductions) = thread::scope(|s| {
        let trucks = s.spawn(|| fetch_truck_map(api));
        let deductions = fetch_deductions_for_view(api, view);
        let trucks = trucks.join().unwrap_or_else(|_| {
            error!("truck fetch thread panicked");
            TruckMap::default()
        });
        (trucks, deductions)
    });

    session.accept_trucks(&ticket, trucks);
    session.accept_deductions(&ticket, deductions);
    report(session, view)
}

/// Delete a deduction, drop it locally, then re-run the week's matching.
pub fn delete_deduction(
    api: &dyn Backend,
    session: &mut ViewSession,
    view: &CalculationView,
    id: &RecordId,
) -> Result<ViewReport, ApiError> {
    api::delete_calculation_unit(api, id)?;
    info!(%id, "deduction deleted");
    session.remove_deduction(id);

    if let Some(ticket) = session.refresh() {
        let deductions = fetch_deductions_for_view(api, view);
        session.accept_deductions(&ticket, deductions);
    }
    Ok(report(session, view))
}
