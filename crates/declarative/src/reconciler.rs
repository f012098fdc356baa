//! Generic reconciler: validate, describe, decide, act, report
//!
//! One [`Reconciler`] wraps one driver. Each request walks
//! `Start -> Described -> Decided -> Executed -> Done | Failed`; dry runs
//! stop after `Start`, operational drivers skip `Described`.

use crate::context::ApplyContext;
use crate::driver::{Capabilities, Driver};
use crate::types::{Decision, DesiredState, Lifecycle, ObservedState, ReconciliationResult, ResourceKind};
use orakit::{Error, Gateway, Result, Secret, Session, redact};

/// Type-erased reconciler so requests of different kinds share one batch.
pub trait Reconcile: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// Converge one request. Failures are reported in the result.
    fn apply(&self, desired: &DesiredState, ctx: &ApplyContext) -> ReconciliationResult;

    /// Describe and decide without acting.
    fn plan(&self, desired: &DesiredState) -> Result<Decision>;
}

/// Drives one resource kind through the gateway.
pub struct Reconciler<'g, D: Driver> {
    driver: D,
    gateway: &'g dyn Gateway,
}

struct Prepared<S> {
    identity: String,
    spec: S,
    caps: Capabilities,
}

impl<'g, D: Driver> Reconciler<'g, D> {
    pub fn new(driver: D, gateway: &'g dyn Gateway) -> Self {
        Self { driver, gateway }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Converge one request.
    pub fn apply(&self, desired: &DesiredState, ctx: &ApplyContext) -> ReconciliationResult {
        match self.try_apply(desired, ctx) {
            Ok(result) => result,
            Err(err) => {
                let secrets = desired.secrets();
                let secrets: Vec<&Secret> = secrets.iter().collect();
                let message = redact(&err.to_string(), &secrets);
                log::warn!("{}: {message}", desired.label());
                ReconciliationResult::failed(err.kind(), message)
            }
        }
    }

    /// Describe and decide without acting.
    pub fn plan(&self, desired: &DesiredState) -> Result<Decision> {
        let prepared = self.prepare(desired)?;
        let session = self.session(desired, &prepared.spec);
        let (decision, _) = self.decide(&session, desired.lifecycle, &prepared)?;
        Ok(decision)
    }

    fn try_apply(&self, desired: &DesiredState, ctx: &ApplyContext) -> Result<ReconciliationResult> {
        let prepared = self.prepare(desired)?;
        if ctx.dry_run {
            return Ok(ReconciliationResult::unchanged(format!(
                "Dry run: {} validated, no changes made.",
                desired.label()
            )));
        }

        let session = self.session(desired, &prepared.spec);
        let (decision, observed) = self.decide(&session, desired.lifecycle, &prepared)?;
        log::debug!("{}: decided {decision}", desired.label());

        let Prepared { identity, spec, caps } = &prepared;
        let outcome = match decision {
            Decision::NoOp { .. } => None,
            Decision::Create => Some(self.driver.create(&session, identity, spec)?),
            Decision::Modify => match self.driver.modify(&session, identity, spec, &observed)? {
                Some(outcome) => Some(outcome),
                None => {
                    let message = self.driver.message(identity, spec, Decision::NoOp { present: true });
                    return Ok(ReconciliationResult::unchanged(message));
                }
            },
            Decision::Delete => Some(self.driver.delete(&session, identity, spec)?),
            Decision::Execute(verb) => Some(self.driver.execute(&session, identity, spec, verb)?),
        };
        let outcome = outcome.map(orakit::ExecutionOutcome::into_result).transpose()?;

        let message = match &outcome {
            Some(outcome) => self.driver.summarize(identity, spec, decision, outcome),
            None => self.driver.message(identity, spec, decision),
        };
        let mut result = if decision.is_noop() || caps.read_only {
            ReconciliationResult::unchanged(message)
        } else {
            ReconciliationResult::changed(message)
        };
        if let Some(facts) = outcome.as_ref().and_then(|o| self.driver.facts(o)) {
            result = result.with_facts(facts);
        }
        Ok(result)
    }

    /// Validate the request before anything reaches the control plane.
    fn prepare(&self, desired: &DesiredState) -> Result<Prepared<D::Spec>> {
        let caps = self.driver.capabilities();
        if !caps.accepts(desired.lifecycle) {
            return Err(Error::config(format!(
                "{} does not support state '{}'",
                self.driver.kind(),
                desired.lifecycle
            )));
        }

        let identity = if desired.identity.trim().is_empty() {
            if !caps.anonymous {
                return Err(Error::config(format!("{} name is required", self.driver.noun())));
            }
            String::new()
        } else {
            self.driver.normalize(&desired.identity)?
        };

        if caps.needs_connection {
            desired.connection.validate()?;
        }

        let spec = self.driver.parse(&desired.attributes)?;
        self.driver.validate(&identity, desired.lifecycle, &spec)?;
        Ok(Prepared { identity, spec, caps })
    }

    fn session<'s>(&'s self, desired: &'s DesiredState, spec: &'s D::Spec) -> Session<'s> {
        self.driver
            .secrets(spec)
            .into_iter()
            .fold(Session::new(self.gateway, &desired.connection), |session, secret| {
                session.with_secret(secret)
            })
    }

    fn decide(
        &self,
        session: &Session,
        lifecycle: Lifecycle,
        prepared: &Prepared<D::Spec>,
    ) -> Result<(Decision, ObservedState)> {
        match lifecycle {
            Lifecycle::Execute(verb) => Ok((Decision::Execute(verb), ObservedState::default())),
            Lifecycle::Present | Lifecycle::Absent => {
                let observed = self.driver.describe(session, &prepared.identity, &prepared.spec)?;
                let decision = Decision::from_states(lifecycle, &observed, prepared.caps.diffable);
                Ok((decision, observed))
            }
        }
    }
}

impl<D: Driver> Reconcile for Reconciler<'_, D> {
    fn kind(&self) -> ResourceKind {
        self.driver.kind()
    }

    fn apply(&self, desired: &DesiredState, ctx: &ApplyContext) -> ReconciliationResult {
        Reconciler::apply(self, desired, ctx)
    }

    fn plan(&self, desired: &DesiredState) -> Result<Decision> {
        Reconciler::plan(self, desired)
    }
}
