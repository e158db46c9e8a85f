//! Processor Task - decoded event and API request processing
//!
//! [`run`] owns an [`AvrcpController`] and serves both inputs of a
//! [`ControlChannels`]: decoded events from the transport side and requests
//! from [`crate::api`]. Each input is processed to completion before the next
//! one is taken, and the Pending Command deadline is checked after every step.
//!
//! # Usage
//!
//! ```rust,ignore
//! use avrcp_controller::{api::ControlChannels, avrcp::AvrcpController, processor};
//!
//! static CHANNELS: ControlChannels<CriticalSectionRawMutex, 8> = ControlChannels::new();
//!
//! #[embassy_executor::task]
//! async fn avrcp_task(transport: MyTransport, clock: MyClock) -> ! {
//!     let mut controller = AvrcpController::new(transport, clock, CHANNELS.outcome_sender());
//!     processor::run(&mut controller, &CHANNELS).await
//! }
//! ```

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::api::{ControlChannels, ControlRequest, ControlResponse};
use crate::avrcp::{AvrcpController, Clock, ControlTransport};

/// Serve events and requests forever
pub async fn run<T, C, M, const N: usize>(
    controller: &mut AvrcpController<'_, T, C, M, N>,
    channels: &ControlChannels<M, N>,
) -> !
where
    T: ControlTransport,
    C: Clock,
    M: RawMutex,
{
    loop {
        match select(channels.events.receive(), channels.requests.receive()).await {
            Either::First(event) => {
                trace!("[PROCESSOR] Event received");
                controller.handle_event(event);
            }
            Either::Second(request) => {
                debug!("[PROCESSOR] API request: {}", request);
                let response = process_request(controller, request);
                debug!("[PROCESSOR] API response: {}", response);
                channels.responses.send(response).await;
            }
        }
        controller.poll_timeout();
    }
}

fn process_request<T, C, M, const N: usize>(
    controller: &mut AvrcpController<'_, T, C, M, N>,
    request: ControlRequest,
) -> ControlResponse
where
    T: ControlTransport,
    C: Clock,
    M: RawMutex,
{
    match request {
        ControlRequest::Connect(address) => ControlResponse::Session(controller.connect(address)),
        ControlRequest::Disconnect => ControlResponse::Session(controller.disconnect()),
        ControlRequest::Command(command) => ControlResponse::Dispatch(controller.dispatch(command)),
        ControlRequest::GetPhase => ControlResponse::Phase(controller.phase()),
        ControlRequest::GetSubscriptions => {
            ControlResponse::Subscriptions(controller.subscriptions())
        }
        ControlRequest::PollTimeout => ControlResponse::TimedOut(controller.poll_timeout()),
    }
}
