//! Call session controller
//!
//! Drives one bridged call from tenant lookup to teardown: resolves the
//! tenant for the dialed number, rejects calls for disabled agents, opens and
//! negotiates the realtime session, then runs both relay pumps until either
//! side stops and closes both sockets once.

use super::dispatcher::{OrderServices, ToolCallDispatcher};
use super::error::BridgeError;
use super::pump::{PumpExit, ShutdownSignal};
use crate::config::RealtimeConfig;
use crate::domain::call::{CallContext, CallOutcome, CallPhase, CallSession};
use crate::domain::shared::PhoneNumber;
use crate::domain::tenant::ConfigResolver;
use crate::infrastructure::protocols::realtime::{
    SessionConfig, UpstreamConnector, UpstreamSpeechClient, UpstreamWriter,
};
use crate::infrastructure::protocols::telephony::DownstreamTelephonyClient;
use crate::infrastructure::protocols::transport::{TelephonyReceiver, TelephonySender};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Shared collaborators handed to every call
#[derive(Clone)]
pub struct BridgeServices {
    pub resolver: Arc<dyn ConfigResolver>,
    pub connector: Arc<dyn UpstreamConnector>,
    pub orders: OrderServices,
    pub realtime: RealtimeConfig,
}

pub struct CallSessionController {
    session: CallSession,
    services: BridgeServices,
    /// Present once the upstream socket is open
    upstream: Option<UpstreamWriter>,
}

impl CallSessionController {
    /// Create the session and resolve its tenant
    ///
    /// A failed lookup is treated like an unknown number: the call proceeds
    /// with the default prompt and voice.
    pub async fn start(
        services: BridgeServices,
        dialed: Option<PhoneNumber>,
        caller: Option<PhoneNumber>,
    ) -> Self {
        let mut session = CallSession::new(CallContext::new(dialed, caller));

        let tenant = match &session.context().dialed_number {
            Some(number) => match services.resolver.lookup(number).await {
                Ok(Some(tenant)) => {
                    debug!("Resolved tenant for {}", number);
                    Some(tenant)
                }
                Ok(None) => {
                    info!("No tenant for {}, using defaults", number);
                    None
                }
                Err(e) => {
                    warn!("Tenant lookup for {} failed, using defaults: {}", number, e);
                    None
                }
            },
            None => {
                info!("Call without dialed number, using defaults");
                None
            }
        };

        if let Err(e) = session.resolve(tenant) {
            warn!("Could not record tenant: {}", e);
        }

        Self {
            session,
            services,
            upstream: None,
        }
    }

    pub fn session(&self) -> &CallSession {
        &self.session
    }

    /// Bridge the call until one side hangs up
    pub async fn run<R, S>(&mut self, telephony_rx: &mut R, telephony_tx: &mut S) -> CallOutcome
    where
        R: TelephonyReceiver + ?Sized,
        S: TelephonySender + ?Sized,
    {
        let session_id = self.session.context().session_id;
        metrics::counter!("orderline_calls_total").increment(1);

        if self.session.should_reject() {
            info!("Agent disabled for call {}, rejecting", session_id);
            metrics::counter!("orderline_calls_rejected_total").increment(1);
            if let Err(e) = self.session.reject() {
                warn!("Call {}: {}", session_id, e);
            }
            if let Err(e) = telephony_tx.close().await {
                debug!("Closing rejected call {}: {}", session_id, e);
            }
            return CallOutcome::Rejected;
        }

        let mut client = match self.connect_upstream().await {
            Ok(client) => client,
            Err(e) => {
                error!("Call {} could not reach the realtime provider: {}", session_id, e);
                self.teardown(telephony_tx).await;
                return CallOutcome::Failed(e.to_string());
            }
        };

        if let Err(e) = self.session.activate() {
            warn!("Call {}: {}", session_id, e);
        }
        info!("Call {} bridged", session_id);

        metrics::gauge!("orderline_active_calls").increment(1.0);
        let (upstream_exit, downstream_exit) = self.relay(&mut client, telephony_rx, telephony_tx).await;
        metrics::gauge!("orderline_active_calls").decrement(1.0);

        debug!(
            "Call {} pumps stopped (upstream: {:?}, telephony: {:?})",
            session_id, upstream_exit, downstream_exit
        );
        self.teardown(telephony_tx).await;

        match (upstream_exit, downstream_exit) {
            (PumpExit::Failed(e), _) | (_, PumpExit::Failed(e)) => CallOutcome::Failed(e.to_string()),
            _ => CallOutcome::Completed,
        }
    }

    /// Close both sockets; only the first call has any effect
    pub async fn teardown<S>(&mut self, telephony_tx: &mut S)
    where
        S: TelephonySender + ?Sized,
    {
        let session_id = self.session.context().session_id;
        if !self.session.begin_teardown() {
            debug!("Call {} already torn down", session_id);
            return;
        }

        if let Some(writer) = &self.upstream {
            if let Err(e) = writer.close().await {
                debug!("Closing realtime leg of call {}: {}", session_id, e);
            }
        }
        if let Err(e) = telephony_tx.close().await {
            debug!("Closing telephony leg of call {}: {}", session_id, e);
        }

        if let Err(e) = self.session.close() {
            warn!("Call {}: {}", session_id, e);
        }
        let duration = chrono::Utc::now() - self.session.created_at();
        info!("Call {} closed after {}s", session_id, duration.num_seconds());
    }

    async fn connect_upstream(&mut self) -> Result<UpstreamSpeechClient, BridgeError> {
        self.session.begin_negotiation()?;

        let context = self.session.context().clone();
        let mut client = UpstreamSpeechClient::connect(self.services.connector.as_ref(), context).await?;
        self.upstream = Some(client.writer().clone());

        let tenant = self.session.tenant();
        let session = SessionConfig::new(
            tenant.instructions(),
            tenant.voice_or(&self.services.realtime.voice),
            &self.services.realtime,
        );
        client.negotiate(session).await?;
        Ok(client)
    }

    async fn relay<R, S>(
        &self,
        client: &mut UpstreamSpeechClient,
        telephony_rx: &mut R,
        telephony_tx: &mut S,
    ) -> (PumpExit, PumpExit)
    where
        R: TelephonyReceiver + ?Sized,
        S: TelephonySender + ?Sized,
    {
        let context = self.session.context().clone();
        let writer = client.writer().clone();
        let shutdown = ShutdownSignal::new();

        let mut dispatcher = ToolCallDispatcher::new(
            context.clone(),
            self.services.orders.clone(),
            writer.clone(),
            self.services.realtime.tool_timeout(),
        );
        let downstream = DownstreamTelephonyClient::new(context, writer);

        tokio::join!(
            client.relay_to_telephony(telephony_tx, &mut dispatcher, &shutdown),
            downstream.relay_to_upstream(telephony_rx, &shutdown),
        )
    }

    pub fn phase(&self) -> CallPhase {
        self.session.phase()
    }
}

/// Run one call end to end over an accepted telephony socket
pub async fn serve_call<R, S>(
    services: BridgeServices,
    dialed: Option<PhoneNumber>,
    caller: Option<PhoneNumber>,
    telephony_rx: &mut R,
    telephony_tx: &mut S,
) -> CallOutcome
where
    R: TelephonyReceiver + ?Sized,
    S: TelephonySender + ?Sized,
{
    let mut controller = CallSessionController::start(services, dialed, caller).await;
    controller.run(telephony_rx, telephony_tx).await
}
