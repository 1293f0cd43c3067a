// crates/nanotec-rs/src/drive/state_machine.rs
use super::session::{DriveSession, LoopPhase};
use super::states::{PowerState, TargetOperation};
use log::{debug, info, trace};

// --- Control Word Bits ---

pub const CW_ENABLE_VOLTAGE: u16 = 0x0002;
pub const CW_FAULT_RESET: u16 = 0x0080;

/// Clears switch-on and quick-stop. Issued when stopping from an enabled state.
pub const fn stop_command(control_word: u16) -> u16 {
    control_word & 0xFF7D
}

/// Clears quick-stop and sets enable-voltage. Issued when pausing a running drive.
pub const fn quick_stop_command(control_word: u16) -> u16 {
    (control_word & 0xFF7B) | CW_ENABLE_VOLTAGE
}

/// One outbound action of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStep {
    /// Nothing to send.
    Idle,
    /// Read the status word.
    ReadStatus,
    /// Read the control word.
    ReadControl,
    /// Write the control word, then read the status word.
    Command(u16),
    /// Write the control word only; a loop transaction is already in flight.
    WriteControl(u16),
}

/// Computes the control word that moves the drive from `state` toward `target`.
///
/// `control_word` is the last value read from the drive; bits the table does
/// not name are carried over unchanged. Returns `None` when the drive is where
/// it should be or the target does not apply to the state.
pub fn next_control_word(
    state: PowerState,
    target: TargetOperation,
    control_word: u16,
) -> Option<u16> {
    use PowerState::*;
    use TargetOperation::*;

    match (state, target) {
        // Faults are acknowledged whatever the intent.
        (Fault, _) => Some(control_word | CW_FAULT_RESET),

        (SwitchedOff, Start) => Some((control_word & 0xFF7E) | 0x0006),
        (Ready, Start) => Some((control_word & 0xFF77) | 0x0007),
        (SwitchedOn | QuickStop, Start) => Some((control_word & 0xFF7F) | 0x000F),

        (Ready | SwitchedOn | Running | QuickStop, Stop) => Some(stop_command(control_word)),
        (Running, Pause) => Some(quick_stop_command(control_word)),

        // Already there, or the target has no meaning in this state.
        _ => None,
    }
}

/// Drives a `DriveSession` from status and control observations.
///
/// Every step consumes the session and returns the updated one together with
/// the next transaction to submit. The loop is a single chain: status read,
/// control read, optional command, status read again, until the drive
/// converges on the target.
pub struct PowerStateMachine;

impl PowerStateMachine {
    /// Handles the outcome of a status word read. `None` means the read failed
    /// or carried no register.
    pub fn on_status_word(
        mut session: DriveSession,
        status: Option<u16>,
    ) -> (DriveSession, LoopStep) {
        let new_state = match status {
            Some(raw) => PowerState::from_status_word(raw),
            None => PowerState::Unknown,
        };
        if new_state != session.power_state {
            info!(
                "Power state changed: {} -> {} (status {:?})",
                session.power_state, new_state, status
            );
        }
        session.power_state = new_state;

        let step = if new_state == PowerState::Unknown {
            LoopStep::ReadStatus
        } else {
            LoopStep::ReadControl
        };
        Self::advance(session, step)
    }

    /// Handles the outcome of a control word read and picks the next command.
    pub fn on_control_word(
        mut session: DriveSession,
        control: Option<u16>,
    ) -> (DriveSession, LoopStep) {
        let Some(control_word) = control else {
            debug!("Control word unavailable, re-reading status.");
            return Self::advance(session, LoopStep::ReadStatus);
        };
        session.last_control_word = Some(control_word);

        if session.power_state == PowerState::Unknown {
            return Self::advance(session, LoopStep::ReadStatus);
        }

        let step = match next_control_word(session.power_state, session.target, control_word) {
            Some(command) => {
                debug!(
                    "{} toward {:?}: control word {:#06x} -> {:#06x}",
                    session.power_state, session.target, control_word, command
                );
                session.last_control_word = Some(command);
                LoopStep::Command(command)
            }
            None => {
                trace!(
                    "{} satisfies {:?}, polling stops.",
                    session.power_state, session.target
                );
                LoopStep::Idle
            }
        };
        Self::advance(session, step)
    }

    /// Applies a new operator intent.
    ///
    /// Start only kicks off the loop. Stop and Pause also produce their command
    /// immediately from the last known control word. A new loop transaction is
    /// only requested when none is in flight; otherwise the running chain
    /// picks the new target up on its next status read.
    pub fn on_intent(
        mut session: DriveSession,
        target: TargetOperation,
    ) -> (DriveSession, LoopStep) {
        if session.target == target {
            if session.phase != LoopPhase::Stalled {
                return (session, LoopStep::Idle);
            }
            info!("Restarting stalled loop toward {:?}.", target);
        } else {
            info!("Target operation: {:?} -> {:?}", session.target, target);
        }
        session.target = target;

        let command = match target {
            TargetOperation::Stop => Some(stop_command(session.command_basis())),
            TargetOperation::Pause => Some(quick_stop_command(session.command_basis())),
            TargetOperation::Start | TargetOperation::Uninitialized => None,
        };
        if let Some(word) = command {
            session.last_control_word = Some(word);
        }

        let idle = !session.is_polling();
        match (command, target) {
            (Some(word), _) if idle => Self::advance(session, LoopStep::Command(word)),
            (Some(word), _) => (session, LoopStep::WriteControl(word)),
            (None, TargetOperation::Start) if idle => Self::advance(session, LoopStep::ReadStatus),
            (None, _) => (session, LoopStep::Idle),
        }
    }

    /// Records which transaction the loop now waits on.
    fn advance(mut session: DriveSession, step: LoopStep) -> (DriveSession, LoopStep) {
        session.phase = match step {
            LoopStep::ReadStatus | LoopStep::Command(_) => LoopPhase::AwaitingStatus,
            LoopStep::ReadControl => LoopPhase::AwaitingControl,
            LoopStep::Idle => LoopPhase::Idle,
            LoopStep::WriteControl(_) => session.phase,
        };
        (session, step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PowerState::*;
    use TargetOperation::*;

    #[test]
    fn test_transition_table() {
        let c = 0x0000;
        assert_eq!(next_control_word(SwitchedOff, Start, c), Some(0x0006));
        assert_eq!(next_control_word(SwitchedOff, Pause, c), None);
        assert_eq!(next_control_word(SwitchedOff, Stop, c), None);
        assert_eq!(next_control_word(Ready, Start, 0x0006), Some(0x0007));
        assert_eq!(next_control_word(Ready, Start, 0x008E), Some(0x0007));
        assert_eq!(next_control_word(Ready, Pause, 0x0006), None);
        assert_eq!(next_control_word(Ready, Stop, 0x0007), Some(0x0005));
        assert_eq!(next_control_word(SwitchedOn, Start, 0x0007), Some(0x000F));
        assert_eq!(next_control_word(SwitchedOn, Pause, 0x0007), None);
        assert_eq!(next_control_word(SwitchedOn, Stop, 0x0007), Some(0x0005));
        assert_eq!(next_control_word(Running, Start, 0x000F), None);
        assert_eq!(next_control_word(Running, Stop, 0x000F), Some(0x000D));
        assert_eq!(next_control_word(Running, Pause, 0x000F), Some(0x000B));
        assert_eq!(next_control_word(QuickStop, Start, 0x000B), Some(0x000F));
        assert_eq!(next_control_word(QuickStop, Stop, 0x000B), Some(0x0009));
        assert_eq!(next_control_word(QuickStop, Pause, 0x000B), None);
        assert_eq!(next_control_word(Unknown, Start, 0x000F), None);
    }

    #[test]
    fn test_transition_preserves_unmasked_bits() {
        let words = [0x0000, 0xFF00, 0xFFFF, 0xA5F0, 0x1230, 0x8001, 0x7F7F, 0x0C4A];
        for c in words {
            assert_eq!(next_control_word(SwitchedOff, Start, c), Some((c & 0xFF7E) | 0x06));
            assert_eq!(next_control_word(Ready, Start, c), Some((c & 0xFF77) | 0x07));
            assert_eq!(next_control_word(SwitchedOn, Start, c), Some((c & 0xFF7F) | 0x0F));
            assert_eq!(next_control_word(QuickStop, Start, c), Some((c & 0xFF7F) | 0x0F));
            for state in [Ready, SwitchedOn, Running, QuickStop] {
                assert_eq!(next_control_word(state, Stop, c), Some(c & 0xFF7D));
            }
            assert_eq!(next_control_word(Running, Pause, c), Some((c & 0xFF7B) | 0x02));
        }

        // Bits outside the masks survive untouched.
        assert_eq!(next_control_word(Ready, Stop, 0xA5F7), Some(0xA575));
        assert_eq!(next_control_word(SwitchedOn, Stop, 0x1237), Some(0x1235));
        assert_eq!(next_control_word(QuickStop, Stop, 0xFF0B), Some(0xFF09));
        assert_eq!(next_control_word(Running, Pause, 0xFF0F), Some(0xFF0B));
    }

    #[test]
    fn test_fault_sets_reset_bit_for_any_target() {
        let words = [0x0000, 0x0008, 0x000F, 0xFF00, 0xA5F0, 0x7F7F, 0xFFFF];
        for target in [Uninitialized, Start, Stop, Pause] {
            for c in words {
                assert_eq!(next_control_word(Fault, target, c), Some(c | 0x0080));
            }
        }
        assert_eq!(next_control_word(Fault, Start, 0x7F7F), Some(0x7FFF));
    }

    #[test]
    fn test_stop_and_pause_from_default_basis() {
        let session = DriveSession::new();
        assert_eq!(stop_command(session.command_basis()), 0x004D);
        assert_eq!(quick_stop_command(session.command_basis()), 0x004B);
    }

    #[test]
    fn test_start_sequence_reaches_running() {
        let session = DriveSession::new();
        let (session, step) = PowerStateMachine::on_intent(session, Start);
        assert_eq!(step, LoopStep::ReadStatus);
        assert_eq!(session.phase, LoopPhase::AwaitingStatus);

        let mut session = session;
        let exchanges = [(0x0040, 0x0000, 0x0006), (0x0021, 0x0006, 0x0007), (0x0023, 0x0007, 0x000F)];
        for (status, control, command) in exchanges {
            let (next, step) = PowerStateMachine::on_status_word(session, Some(status));
            assert_eq!(step, LoopStep::ReadControl);
            assert_eq!(next.phase, LoopPhase::AwaitingControl);
            let (next, step) = PowerStateMachine::on_control_word(next, Some(control));
            assert_eq!(step, LoopStep::Command(command));
            assert_eq!(next.phase, LoopPhase::AwaitingStatus);
            session = next;
        }

        let (session, step) = PowerStateMachine::on_status_word(session, Some(0x0027));
        assert_eq!(session.power_state, Running);
        assert_eq!(step, LoopStep::ReadControl);
        let (session, step) = PowerStateMachine::on_control_word(session, Some(0x000F));
        assert_eq!(step, LoopStep::Idle);
        assert_eq!(session.phase, LoopPhase::Idle);
    }

    #[test]
    fn test_missing_status_marks_unknown_and_rereads() {
        let mut session = DriveSession::new();
        session.power_state = Running;
        let (session, step) = PowerStateMachine::on_status_word(session, None);
        assert_eq!(session.power_state, Unknown);
        assert_eq!(step, LoopStep::ReadStatus);

        let (session, step) = PowerStateMachine::on_status_word(session, Some(0x0001));
        assert_eq!(session.power_state, Unknown);
        assert_eq!(step, LoopStep::ReadStatus);
    }

    #[test]
    fn test_missing_control_rereads_status() {
        let (session, _) = PowerStateMachine::on_intent(DriveSession::new(), Start);
        let (session, _) = PowerStateMachine::on_status_word(session, Some(0x0040));
        let (session, step) = PowerStateMachine::on_control_word(session, None);
        assert_eq!(step, LoopStep::ReadStatus);
        assert_eq!(session.phase, LoopPhase::AwaitingStatus);
    }

    #[test]
    fn test_repeated_intent_is_ignored() {
        let (session, _) = PowerStateMachine::on_intent(DriveSession::new(), Start);
        let (again, step) = PowerStateMachine::on_intent(session, Start);
        assert_eq!(step, LoopStep::Idle);
        assert_eq!(again, session);
    }

    #[test]
    fn test_repeated_intent_restarts_stalled_loop() {
        let (mut session, _) = PowerStateMachine::on_intent(DriveSession::new(), Start);
        session.phase = LoopPhase::Stalled;
        let (session, step) = PowerStateMachine::on_intent(session, Start);
        assert_eq!(step, LoopStep::ReadStatus);
        assert_eq!(session.phase, LoopPhase::AwaitingStatus);

        let mut session = session;
        session.phase = LoopPhase::Stalled;
        session.target = Stop;
        session.last_control_word = Some(0x000F);
        let (session, step) = PowerStateMachine::on_intent(session, Stop);
        assert_eq!(step, LoopStep::Command(0x000D));
        assert_eq!(session.phase, LoopPhase::AwaitingStatus);
    }

    #[test]
    fn test_stop_while_polling_only_writes() {
        let (session, _) = PowerStateMachine::on_intent(DriveSession::new(), Start);
        let (session, _) = PowerStateMachine::on_status_word(session, Some(0x0027));
        let (session, step) = PowerStateMachine::on_intent(session, Stop);
        assert_eq!(step, LoopStep::WriteControl(0x004D));
        assert_eq!(session.phase, LoopPhase::AwaitingControl);
        assert_eq!(session.last_control_word, Some(0x004D));
    }

    #[test]
    fn test_pause_when_idle_commands_and_polls() {
        let mut session = DriveSession::new();
        session.last_control_word = Some(0x000F);
        let (session, step) = PowerStateMachine::on_intent(session, Pause);
        assert_eq!(step, LoopStep::Command(0x000B));
        assert_eq!(session.phase, LoopPhase::AwaitingStatus);
    }

    #[test]
    fn test_fault_keeps_polling() {
        let (session, _) = PowerStateMachine::on_intent(DriveSession::new(), Start);
        let (session, _) = PowerStateMachine::on_status_word(session, Some(0x0008));
        assert_eq!(session.power_state, Fault);
        let (session, step) = PowerStateMachine::on_control_word(session, Some(0x0000));
        assert_eq!(step, LoopStep::Command(0x0080));
        let (session, _) = PowerStateMachine::on_status_word(session, Some(0x0028));
        let (_, step) = PowerStateMachine::on_control_word(session, Some(0x0080));
        assert_eq!(step, LoopStep::Command(0x0080));
    }
}
