use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, trace, warn};

use super::{AttitudeProvider, ProviderID};
use crate::astro::{Attitude, Epoch, Frame, PVCoordinatesProvider, TimeStamped};
use crate::error::{Error, Result};
use crate::propagation::events::{Action, EventDetector};
use crate::propagation::SpacecraftState;

/// Slot holding the active provider, shared between a sequence and the
/// switches it hands out.
type ActiveSlot = Rc<Cell<Option<ProviderID>>>;

/// Source of the stamps that tie a [ProviderID] to the sequence that made it.
static NEXT_SEQUENCE_ID: AtomicUsize = AtomicUsize::new(0);

struct Transition {
    detector: Rc<dyn EventDetector>,
    switch_on_increase: bool,
    switch_on_decrease: bool,
    next: ProviderID,
}

/// Switches between attitude providers when events occur.
///
/// Providers are added to the sequence, which owns them and hands back a
/// [ProviderID]. Transitions between them are declared with
/// [add_switching_condition](Self::add_switching_condition), then exposed as
/// event detectors with [expose_detectors](Self::expose_detectors), for a
/// propagator to watch. When one of those fires in the right direction, the
/// sequence starts delegating to the transition's target provider.
///
/// The active provider is shared with the exposed detectors, not synchronized:
/// a sequence and its switches belong to a single propagation at a time.
pub struct AttitudesSequence {
    id: usize,
    providers: Vec<Box<dyn AttitudeProvider>>,
    /// Outgoing transitions of every provider mentioned so far
    transitions: BTreeMap<ProviderID, Vec<Transition>>,
    active: ActiveSlot,
    exposed: bool,
}

impl Default for AttitudesSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl AttitudesSequence {
    pub fn new() -> Self {
        AttitudesSequence {
            id: NEXT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed),
            providers: Vec::new(),
            transitions: BTreeMap::new(),
            active: Rc::new(Cell::new(None)),
            exposed: false,
        }
    }

    /// Takes ownership of a provider. The provider does not take part in any
    /// switching until it is named by one of the registration methods.
    pub fn add_provider(&mut self, provider: impl AttitudeProvider + 'static) -> ProviderID {
        let id = ProviderID::new(self.id, self.providers.len());
        self.providers.push(Box::new(provider));
        id
    }

    /// `None` for handles from another sequence.
    pub fn provider(&self, id: ProviderID) -> Option<&dyn AttitudeProvider> {
        if id.sequence != self.id {
            return None;
        }
        self.providers.get(id.index).map(|p| p.as_ref())
    }

    pub fn active_provider(&self) -> Option<ProviderID> {
        self.active.get()
    }

    /// Providers that have been named in a reset or a switching condition.
    pub fn registered_providers(&self) -> impl Iterator<Item = ProviderID> + '_ {
        self.transitions.keys().copied()
    }

    /// Number of transitions leaving `id`.
    pub fn switching_condition_count(&self, id: ProviderID) -> usize {
        self.transitions.get(&id).map_or(0, Vec::len)
    }

    fn check_owned(&self, id: ProviderID) -> Result<()> {
        match self.provider(id) {
            Some(_) => Ok(()),
            None => Err(Error::UnknownProvider(id)),
        }
    }

    fn register(&mut self, id: ProviderID) -> Result<&mut Vec<Transition>> {
        self.check_owned(id)?;
        Ok(self.transitions.entry(id).or_default())
    }

    /// Makes `id` the active provider, whatever was active before.
    pub fn reset_active_provider(&mut self, id: ProviderID) -> Result<()> {
        self.register(id)?;
        self.active.set(Some(id));
        Ok(())
    }

    /// Declares a transition from `before` to `after`: a crossing of `detector`
    /// in one of the enabled directions makes `after` the active provider.
    ///
    /// If no provider is active yet, `before` becomes active. A provider may
    /// have any number of outgoing transitions. Every transition is watched for
    /// the whole propagation, so its switch fires even if `before` is no longer
    /// the active provider by then.
    pub fn add_switching_condition<D: EventDetector + 'static>(
        &mut self,
        before: ProviderID,
        detector: D,
        switch_on_increase: bool,
        switch_on_decrease: bool,
        after: ProviderID,
    ) -> Result<()> {
        self.check_owned(before)?;
        self.check_owned(after)?;
        self.register(after)?;
        self.add_absorbing_provider(before)?;
        self.register(before)?.push(Transition {
            detector: Rc::new(detector),
            switch_on_increase,
            switch_on_decrease,
            next: after,
        });
        Ok(())
    }

    /// Registers `before` without adding a transition, so it is a valid state
    /// that nothing leaves (until a later call adds a transition).
    ///
    /// If no provider is active yet, `before` becomes active.
    pub fn add_absorbing_provider(&mut self, before: ProviderID) -> Result<()> {
        self.register(before)?;
        if self.active.get().is_none() {
            self.active.set(Some(before));
        }
        Ok(())
    }

    /// Returns one event detector per declared transition, to be handed to the
    /// propagator before it starts.
    ///
    /// Transitions declared after this call are not included.
    pub fn expose_detectors(&mut self) -> Vec<Switch> {
        if self.exposed {
            warn!("switching detectors exposed more than once; transitions may fire twice");
        }
        self.exposed = true;

        let active = &self.active;
        self.transitions
            .iter()
            .flat_map(|(&from, transitions)| {
                transitions.iter().map(move |t| Switch {
                    detector: Rc::clone(&t.detector),
                    switch_on_increase: t.switch_on_increase,
                    switch_on_decrease: t.switch_on_decrease,
                    from,
                    next: t.next,
                    active: Rc::clone(active),
                })
            })
            .collect()
    }

    /// Attitude according to the active provider.
    pub fn current_attitude(
        &self,
        pv: &dyn PVCoordinatesProvider,
        date: Epoch,
        frame: &Frame,
    ) -> Result<Attitude> {
        let id = self.active.get().ok_or(Error::NoActiveProvider)?;
        let provider = self.provider(id).ok_or(Error::UnknownProvider(id))?;
        provider.get_attitude(pv, date, frame)
    }
}

impl AttitudeProvider for AttitudesSequence {
    fn get_attitude(
        &self,
        pv: &dyn PVCoordinatesProvider,
        date: Epoch,
        frame: &Frame,
    ) -> Result<Attitude> {
        self.current_attitude(pv, date, frame)
    }
}

/// Event detector for one transition of an [AttitudesSequence].
///
/// Behaves exactly like the wrapped detector, except that a crossing in an
/// enabled direction also switches the sequence to the target provider, just
/// before the wrapped detector decides what the propagator should do.
#[derive(Clone)]
pub struct Switch {
    detector: Rc<dyn EventDetector>,
    switch_on_increase: bool,
    switch_on_decrease: bool,
    from: ProviderID,
    next: ProviderID,
    active: ActiveSlot,
}

impl Switch {
    /// Provider whose transition this is.
    pub fn source(&self) -> ProviderID {
        self.from
    }

    pub fn next(&self) -> ProviderID {
        self.next
    }

    pub fn detector(&self) -> &dyn EventDetector {
        self.detector.as_ref()
    }

    /// Provider currently active in the sequence this switch came from.
    pub fn active_provider(&self) -> Option<ProviderID> {
        self.active.get()
    }

    fn applies_to(&self, increasing: bool) -> bool {
        (increasing && self.switch_on_increase) || (!increasing && self.switch_on_decrease)
    }
}

impl EventDetector for Switch {
    fn g(&self, state: &SpacecraftState) -> Result<f64> {
        self.detector.g(state)
    }

    fn max_check_interval(&self) -> f64 {
        self.detector.max_check_interval()
    }

    fn threshold(&self) -> f64 {
        self.detector.threshold()
    }

    fn max_iteration_count(&self) -> usize {
        self.detector.max_iteration_count()
    }

    fn event_occurred(&self, state: &SpacecraftState, increasing: bool) -> Result<Action> {
        if self.applies_to(increasing) {
            let previous = self.active.replace(Some(self.next));
            debug!(
                date = %state.date(),
                from = ?previous,
                to = ?self.next,
                increasing,
                "switching attitude provider"
            );
        } else {
            trace!(
                date = %state.date(),
                from = ?self.from,
                to = ?self.next,
                increasing,
                "crossing in a disabled direction, not switching"
            );
        }
        self.detector.event_occurred(state, increasing)
    }

    fn reset_state(&self, old_state: &SpacecraftState) -> Result<SpacecraftState> {
        self.detector.reset_state(old_state)
    }
}
