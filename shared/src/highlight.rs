use std::time::Duration;

use crate::markers::MarkerKey;

/// Where a pointer event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    List,
    Map,
    Popup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightState {
    #[default]
    Idle,
    Hovering {
        target: MarkerKey,
        source: PointerSource,
    },
    Locked {
        target: MarkerKey,
    },
}

impl HighlightState {
    pub fn target(&self) -> Option<MarkerKey> {
        match self {
            Self::Idle => None,
            Self::Hovering { target, .. } | Self::Locked { target } => Some(*target),
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }

    /// A POI info popup belongs to this state when the POI is locked or is
    /// being hovered on the map side (marker or popup itself).
    pub fn popup_target(&self) -> Option<MarkerKey> {
        match self {
            Self::Locked { target } if target.is_poi() => Some(*target),
            Self::Hovering {
                target,
                source: PointerSource::Map | PointerSource::Popup,
            } if target.is_poi() => Some(*target),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightEvent {
    Enter {
        target: MarkerKey,
        source: PointerSource,
    },
    Leave {
        target: MarkerKey,
        source: PointerSource,
    },
    PopupEnter,
    PopupLeave,
    MarkerClick(MarkerKey),
    CanvasClick,
    DismissalElapsed(DismissToken),
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightChange {
    pub previous: HighlightState,
    pub current: HighlightState,
}

impl HighlightChange {
    /// Target that lost emphasis, if the emphasized entity changed.
    pub fn released(&self) -> Option<MarkerKey> {
        let previous = self.previous.target()?;
        (Some(previous) != self.current.target()).then_some(previous)
    }

    /// Target that gained emphasis, if the emphasized entity changed.
    pub fn acquired(&self) -> Option<MarkerKey> {
        let current = self.current.target()?;
        (Some(current) != self.previous.target()).then_some(current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DismissToken(u64);

/// Request for the host to deliver `DismissalElapsed(token)` after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledDismissal {
    pub token: DismissToken,
    pub delay: Duration,
}

/// Outcome of feeding one event to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reaction {
    pub change: Option<HighlightChange>,
    pub dismissal: Option<ScheduledDismissal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingDismissal {
    token: DismissToken,
    target: MarkerKey,
}

/// The one delayed dismissal a coordinator may have in flight. Arming always
/// drops the previous one, so an old wake-up can never match.
#[derive(Debug, Default)]
pub struct DismissTimer {
    next_token: u64,
    pending: Option<PendingDismissal>,
}

impl DismissTimer {
    fn arm(&mut self, target: MarkerKey, delay: Duration) -> ScheduledDismissal {
        self.cancel();
        self.next_token += 1;
        let token = DismissToken(self.next_token);
        self.pending = Some(PendingDismissal { token, target });
        ScheduledDismissal { token, delay }
    }

    fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::trace!(token = pending.token.0, target = %pending.target, "dismissal cancelled");
        }
    }

    /// Consumes the pending dismissal if `token` is the current one.
    fn fire(&mut self, token: DismissToken) -> Option<MarkerKey> {
        match self.pending {
            Some(pending) if pending.token == token => {
                self.pending = None;
                Some(pending.target)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Single source of truth for which stop or POI is emphasized.
#[derive(Debug)]
pub struct Coordinator {
    state: HighlightState,
    timer: DismissTimer,
    dismiss_grace: Duration,
}

impl Coordinator {
    pub fn new(dismiss_grace: Duration) -> Self {
        Self {
            state: HighlightState::Idle,
            timer: DismissTimer::default(),
            dismiss_grace,
        }
    }

    pub fn state(&self) -> HighlightState {
        self.state
    }

    pub fn timer(&self) -> &DismissTimer {
        &self.timer
    }

    pub fn handle(&mut self, event: HighlightEvent) -> Reaction {
        match event {
            HighlightEvent::Enter { target, source } => {
                self.timer.cancel();
                match self.state {
                    HighlightState::Locked { target: locked } if locked == target => {
                        Reaction::default()
                    }
                    _ => self.transition(HighlightState::Hovering { target, source }),
                }
            }
            HighlightEvent::Leave { target, source } => match self.state {
                HighlightState::Hovering { target: current, .. } if current == target => {
                    if target.is_poi() && source != PointerSource::List {
                        self.defer_dismissal(target)
                    } else {
                        self.timer.cancel();
                        self.transition(HighlightState::Idle)
                    }
                }
                _ => Reaction::default(),
            },
            HighlightEvent::PopupEnter => {
                self.timer.cancel();
                match self.state {
                    HighlightState::Hovering { target, .. } if target.is_poi() => {
                        self.transition(HighlightState::Hovering {
                            target,
                            source: PointerSource::Popup,
                        })
                    }
                    _ => Reaction::default(),
                }
            }
            HighlightEvent::PopupLeave => match self.state {
                HighlightState::Hovering { target, .. } if target.is_poi() => {
                    self.defer_dismissal(target)
                }
                _ => Reaction::default(),
            },
            HighlightEvent::MarkerClick(target) => {
                if !target.is_poi() {
                    return Reaction::default();
                }
                self.timer.cancel();
                match self.state {
                    HighlightState::Locked { target: locked } if locked == target => {
                        self.transition(HighlightState::Idle)
                    }
                    _ => self.transition(HighlightState::Locked { target }),
                }
            }
            HighlightEvent::CanvasClick => {
                // only an unlocking click cancels a pending dismissal
                if self.state.is_locked() {
                    self.timer.cancel();
                    self.transition(HighlightState::Idle)
                } else {
                    Reaction::default()
                }
            }
            HighlightEvent::DismissalElapsed(token) => match self.timer.fire(token) {
                Some(target)
                    if matches!(
                        self.state,
                        HighlightState::Hovering { target: current, .. } if current == target
                    ) =>
                {
                    self.transition(HighlightState::Idle)
                }
                _ => Reaction::default(),
            },
            HighlightEvent::Clear => {
                self.timer.cancel();
                self.transition(HighlightState::Idle)
            }
        }
    }

    fn defer_dismissal(&mut self, target: MarkerKey) -> Reaction {
        let scheduled = self.timer.arm(target, self.dismiss_grace);
        Reaction {
            change: None,
            dismissal: Some(scheduled),
        }
    }

    fn transition(&mut self, next: HighlightState) -> Reaction {
        if next == self.state {
            return Reaction::default();
        }
        let change = HighlightChange {
            previous: self.state,
            current: next,
        };
        tracing::debug!(previous = ?change.previous, current = ?change.current, "highlight transition");
        self.state = next;
        Reaction {
            change: Some(change),
            dismissal: None,
        }
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(crate::HighlightConfig::default().dismiss_grace)
    }
}
