// crates/nanotec-rs/src/motor.rs
//! Operator-facing control of one drive.

use crate::config::DriveConfig;
use crate::dispatcher::{Delivery, Dispatcher};
use crate::drive::{
    DriveSession, LoopPhase, LoopStep, Polarity, PowerState, PowerStateMachine, TargetOperation,
};
use crate::hal::{LinkEvent, NanotecError, Transport};
use crate::od::{self, WORD_REGISTER_COUNT};
use crate::types::ObjectAddress;
use log::{debug, error, info, trace, warn};

/// Runs a drive in Profile Velocity mode over a `Transport`.
///
/// Nothing here blocks. Intents submit their requests and return; the
/// application calls `process_events` to feed responses back into the power
/// state machine, which in turn submits the next request until the drive has
/// reached the requested operation.
pub struct MotorController<T: Transport> {
    dispatcher: Dispatcher<T>,
    config: DriveConfig,
    session: DriveSession,
    connected: bool,
}

impl<T: Transport> MotorController<T> {
    /// Creates a controller. It stays disconnected until the transport reports
    /// `LinkEvent::Connected` through `process_events`.
    pub fn new(transport: T, config: DriveConfig) -> Self {
        info!("Creating motor controller for node {}.", config.node_id.0);
        Self {
            dispatcher: Dispatcher::new(transport, config.node_id),
            config,
            session: DriveSession::new(),
            connected: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn power_state(&self) -> PowerState {
        self.session.power_state
    }

    pub fn target_operation(&self) -> TargetOperation {
        self.session.target
    }

    pub fn session(&self) -> &DriveSession {
        &self.session
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        self.dispatcher.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.dispatcher.transport_mut()
    }

    // --- Intents ---

    /// Switches the drive to Profile Velocity mode and writes the ramp parameters.
    /// The power state is left untouched.
    pub fn initialize_profile_velocity(&mut self) -> Result<(), NanotecError> {
        self.ensure_connected()?;
        info!("Initializing Profile Velocity mode.");
        for (address, payload) in self.config.profile.writes() {
            self.dispatcher.send_write(address, &payload)?;
        }
        Ok(())
    }

    /// Sets the velocity setpoint and brings the drive to Operation Enabled.
    ///
    /// Polarity and speed are only written when they differ from the values
    /// last written on this session.
    pub fn start_motor(&mut self, speed: u32, polarity: Polarity) -> Result<(), NanotecError> {
        self.ensure_connected()?;

        if self.session.polarity != Some(polarity) {
            debug!("Polarity -> {:?}", polarity);
            self.dispatcher
                .send_write(od::POLARITY, &[polarity.object_value()])?;
            self.session.polarity = Some(polarity);
        }
        if self.session.speed != Some(speed) {
            debug!("Target velocity -> {}", speed);
            self.dispatcher
                .send_write(od::TARGET_VELOCITY, &speed.to_le_bytes())?;
            self.session.speed = Some(speed);
        }

        self.apply_intent(TargetOperation::Start)
    }

    /// Disables the power stage.
    pub fn stop_motor(&mut self) -> Result<(), NanotecError> {
        self.ensure_connected()?;
        self.apply_intent(TargetOperation::Stop)
    }

    /// Brings a running drive to Quick Stop Active.
    pub fn pause_motor(&mut self) -> Result<(), NanotecError> {
        self.ensure_connected()?;
        self.apply_intent(TargetOperation::Pause)
    }

    // --- Event Processing ---

    /// Drains link events, then handles the completions of the transactions
    /// that were pending when the call started.
    ///
    /// Requests submitted while handling them are left for the next call, so
    /// a drive that never converges still hands control back to the caller.
    /// Returns the number of completions handled.
    pub fn process_events(&mut self) -> usize {
        while let Some(event) = self.dispatcher.poll_link() {
            self.handle_link_event(event);
        }

        let limit = self.dispatcher.pending_count();
        let mut handled = 0;
        while handled < limit {
            let Some(delivery) = self.dispatcher.poll() else {
                break;
            };
            handled += 1;
            self.handle_delivery(delivery);
        }
        handled
    }

    fn handle_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Connected => {
                self.connected = true;
                self.session = DriveSession::new();
            }
            LinkEvent::Disconnected => {
                self.connected = false;
                self.session.phase = LoopPhase::Idle;
            }
        }
    }

    fn handle_delivery(&mut self, delivery: Delivery) {
        let (session, step) = match (self.session.phase, delivery) {
            (LoopPhase::AwaitingStatus, Delivery::StatusWord(status)) => {
                PowerStateMachine::on_status_word(self.session, status)
            }
            (LoopPhase::AwaitingControl, Delivery::ControlWord(control)) => {
                PowerStateMachine::on_control_word(self.session, control)
            }
            (phase, Delivery::StatusWord(_) | Delivery::ControlWord(_)) => {
                warn!("Observation arrived while loop is {:?}, ignoring.", phase);
                return;
            }
            (_, Delivery::Completed { address, payload }) => {
                trace!("{} completed: {:?}", address, payload);
                return;
            }
            (_, Delivery::Discarded) => return,
        };
        self.session = session;
        if let Err(e) = self.run_step(step) {
            error!("Polling loop stopped, could not submit {:?}: {}", step, e);
        }
    }

    // --- Internals ---

    fn ensure_connected(&self) -> Result<(), NanotecError> {
        if self.connected {
            Ok(())
        } else {
            Err(NanotecError::NotConnected)
        }
    }

    fn apply_intent(&mut self, target: TargetOperation) -> Result<(), NanotecError> {
        let (session, step) = PowerStateMachine::on_intent(self.session, target);
        self.session = session;
        self.run_step(step)
    }

    /// Submits the requests of one loop step. If a loop transaction cannot be
    /// submitted the loop stalls until the next intent restarts it.
    fn run_step(&mut self, step: LoopStep) -> Result<(), NanotecError> {
        let result = match step {
            LoopStep::Idle => Ok(()),
            LoopStep::ReadStatus => self.read_word(od::STATUS_WORD),
            LoopStep::ReadControl => self.read_word(od::CONTROL_WORD),
            LoopStep::Command(word) => self
                .write_control_word(word)
                .and_then(|_| self.read_word(od::STATUS_WORD)),
            LoopStep::WriteControl(word) => self.write_control_word(word),
        };
        if result.is_err() && !matches!(step, LoopStep::WriteControl(_)) {
            self.session.phase = LoopPhase::Stalled;
        }
        result
    }

    fn read_word(&mut self, address: ObjectAddress) -> Result<(), NanotecError> {
        self.dispatcher
            .send_read(address, WORD_REGISTER_COUNT)
            .map(|_| ())
    }

    fn write_control_word(&mut self, word: u16) -> Result<(), NanotecError> {
        self.dispatcher
            .send_write(od::CONTROL_WORD, &word.to_le_bytes())
            .map(|_| ())
    }
}
