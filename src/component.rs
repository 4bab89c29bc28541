//! Defines the Component trait, used by every stage that consumes a stream
//! of inputs on its own thread. A component owns its state outright and sees
//! its inputs strictly in the order they were sent, so the navigation
//! session and the audio-engine mirror never need locks.

use log::{info, warn};
use std::fmt;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::error::NavError;

/// Raised by [Component::finalize] when a stage cannot shut down cleanly.
#[derive(Debug)]
pub enum ComponentError {
    /// The navigation session failed while tearing down.
    Session(NavError),
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentError::Session(e) => write!(f, "session teardown failed: {}", e),
        }
    }
}

impl std::error::Error for ComponentError {}

///
/// A stage that turns each input into one output. Anything that should run
/// as a serialized processing point implements Component, so that it can be
/// driven by [run_component].
///
pub trait Component: fmt::Display {
    type InData;
    type OutData;

    /// Converts an input of type A into an output of type B
    fn convert(&mut self, input: Self::InData) -> Self::OutData;

    /// Cleans up once every sender of the input channel is gone
    fn finalize(&mut self) -> Result<(), ComponentError>;
}

/// Runs the given Component on its own thread. On receiving data of type
/// InData on the input channel, the Component converts them to data of type
/// OutData and sends it to the output channel. A dropped output receiver is
/// logged and otherwise ignored; the component keeps consuming input until
/// every input sender is dropped.
pub fn run_component<C: Component + Send + 'static>(
    mut component: Box<C>,
    input: Receiver<<C as Component>::InData>,
    output: Sender<<C as Component>::OutData>,
) -> JoinHandle<()>
where
    <C as Component>::InData: Send + 'static,
    <C as Component>::OutData: Send + 'static,
{
    thread::spawn(move || {
        let mut output_open = true;
        while let Ok(data) = input.recv() {
            let out_data = component.convert(data);
            if output_open {
                if let Err(error) = output.send(out_data) {
                    warn!("{} : received error {}.", component, error);
                    output_open = false;
                }
            }
        }

        if let Err(component_error) = component.finalize() {
            warn!("{} : error during terminating : {}.", component, component_error);
        }
        info!("{} : terminated.", component);
    })
}
