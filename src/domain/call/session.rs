//! Call session aggregate

use crate::domain::call::value_object::CallPhase;
use crate::domain::shared::error::{DomainError, Result};
use crate::domain::shared::value_objects::{CallSessionId, PhoneNumber};
use crate::domain::tenant::TenantConfig;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Per-call context handed to every component working on the call
#[derive(Debug, Clone)]
pub struct CallContext {
    pub session_id: CallSessionId,
    /// Number the caller dialed; identifies the tenant
    pub dialed_number: Option<PhoneNumber>,
    /// Caller's number, used as the order's customer phone
    pub caller_number: Option<PhoneNumber>,
}

impl CallContext {
    pub fn new(dialed_number: Option<PhoneNumber>, caller_number: Option<PhoneNumber>) -> Self {
        Self {
            session_id: CallSessionId::new(),
            dialed_number,
            caller_number,
        }
    }

    pub fn caller(&self) -> Option<&str> {
        self.caller_number.as_ref().map(PhoneNumber::as_str)
    }
}

/// One bridged call
#[derive(Debug)]
pub struct CallSession {
    context: Arc<CallContext>,
    tenant: Arc<TenantConfig>,
    /// Whether `tenant` came from the resolver rather than defaults
    tenant_resolved: bool,
    phase: CallPhase,
    created_at: DateTime<Utc>,
}

impl CallSession {
    pub fn new(context: CallContext) -> Self {
        Self {
            context: Arc::new(context),
            tenant: Arc::new(TenantConfig::default()),
            tenant_resolved: false,
            phase: CallPhase::Init,
            created_at: Utc::now(),
        }
    }

    pub fn context(&self) -> &Arc<CallContext> {
        &self.context
    }

    pub fn tenant(&self) -> &Arc<TenantConfig> {
        &self.tenant
    }

    pub fn tenant_resolved(&self) -> bool {
        self.tenant_resolved
    }

    pub fn phase(&self) -> CallPhase {
        self.phase
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Record the tenant configuration; `None` keeps the defaults
    pub fn resolve(&mut self, tenant: Option<TenantConfig>) -> Result<()> {
        self.transition_to(CallPhase::ConfigResolved)?;
        if let Some(tenant) = tenant {
            self.tenant = Arc::new(tenant);
            self.tenant_resolved = true;
        }
        Ok(())
    }

    /// A resolved tenant with the agent switched off must not be bridged
    pub fn should_reject(&self) -> bool {
        self.tenant_resolved && !self.tenant.agent_enabled
    }

    pub fn reject(&mut self) -> Result<()> {
        self.transition_to(CallPhase::Rejected)
    }

    pub fn begin_negotiation(&mut self) -> Result<()> {
        self.transition_to(CallPhase::Negotiating)
    }

    pub fn activate(&mut self) -> Result<()> {
        self.transition_to(CallPhase::Active)
    }

    /// Mark the call as terminating
    ///
    /// Returns `false` when teardown already started, so callers close the
    /// sockets exactly once.
    pub fn begin_teardown(&mut self) -> bool {
        match self.phase {
            CallPhase::Negotiating | CallPhase::Active => {
                self.phase = CallPhase::Terminating;
                true
            }
            _ => false,
        }
    }

    pub fn close(&mut self) -> Result<()> {
        self.transition_to(CallPhase::Closed)
    }

    fn transition_to(&mut self, next: CallPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(DomainError::InvalidStateTransition(format!(
                "{:?} -> {:?}",
                self.phase, next
            )));
        }
        self.phase = next;
        Ok(())
    }
}
