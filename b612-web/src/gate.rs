use crate::input::{InteractionSignal, SourceKind};

/// Narrative gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKey {
    /// Desert → moon, opened by the parked airplane.
    Airplane,
    /// Moon → flower field, opened by the rose once the plane has left.
    Rose,
}

impl GateKey {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Airplane => "airplane",
            Self::Rose => "rose",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Locked,
    Armed,
    Fired,
}

/// A one-shot transition guarded against repeat firing.
#[derive(Debug, Clone)]
pub struct Gate {
    key: GateKey,
    state: GateState,
    fired_by: Option<SourceKind>,
}

impl Gate {
    pub fn locked(key: GateKey) -> Self {
        Self {
            key,
            state: GateState::Locked,
            fired_by: None,
        }
    }

    pub fn armed(key: GateKey) -> Self {
        Self {
            key,
            state: GateState::Armed,
            fired_by: None,
        }
    }

    pub fn key(&self) -> GateKey {
        self.key
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Source of the signal that fired the gate.
    pub fn fired_by(&self) -> Option<SourceKind> {
        self.fired_by
    }

    /// Locked → Armed. Returns false in any other state.
    pub fn arm(&mut self) -> bool {
        if self.state != GateState::Locked {
            return false;
        }
        self.state = GateState::Armed;
        true
    }

    /// Offer a signal. Returns true only for the one signal that fires the
    /// gate; everything else is ignored.
    pub fn offer(&mut self, signal: &InteractionSignal) -> bool {
        match self.state {
            GateState::Armed => {
                self.state = GateState::Fired;
                self.fired_by = Some(signal.source);
                log::info!(
                    "Gate '{}' fired by {} at {} ms",
                    self.key.label(),
                    signal.source.label(),
                    signal.at
                );
                true
            }
            GateState::Locked => {
                log::info!(
                    "Gate '{}' is locked, ignoring {} on {}",
                    self.key.label(),
                    signal.source.label(),
                    signal.target
                );
                false
            }
            GateState::Fired => {
                log::debug!(
                    "Gate '{}' already fired, ignoring {}",
                    self.key.label(),
                    signal.source.label()
                );
                false
            }
        }
    }
}
