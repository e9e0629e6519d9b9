//! Confirmation and denial of pending rumours

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{Rumour, RumourId, RumourStatus, Transfer};
use crate::reputation::{
    award_bonus, BonusOutcome, GamificationPolicy, Outcome, PointEvent, ScoreAdjuster, SkipReason,
};
use crate::store::{RumourStore, TransferStore};

pub struct ConfirmationWorkflow {
    rumours: Arc<dyn RumourStore>,
    /// Elevated handle: the confirming actor is not the rumour's creator
    transfers: Arc<dyn TransferStore>,
    adjuster: Arc<dyn ScoreAdjuster>,
    policy: GamificationPolicy,
}

impl ConfirmationWorkflow {
    pub fn new(
        rumours: Arc<dyn RumourStore>,
        transfers: Arc<dyn TransferStore>,
        adjuster: Arc<dyn ScoreAdjuster>,
        policy: GamificationPolicy,
    ) -> Self {
        Self {
            rumours,
            transfers,
            adjuster,
            policy,
        }
    }

    /// Confirm a pending rumour.
    ///
    /// The Transfer is written before the status, so a rumour is never
    /// marked confirmed without one. If the status write then fails the
    /// Transfer is left behind; confirming again adopts it and finishes.
    pub async fn confirm(&self, rumour_id: RumourId) -> EngineResult<Outcome<()>> {
        let rumour = self.load_rumour(rumour_id).await?;
        self.confirm_rumour(rumour).await
    }

    /// Confirm the most recently created pending rumour.
    ///
    /// Ops utility: concurrent callers may race for the same rumour, in
    /// which case the loser sees `NotPending`.
    pub async fn confirm_latest_pending(&self) -> EngineResult<Outcome<RumourId>> {
        let rumour = self
            .rumours
            .latest_pending_rumour()
            .await?
            .ok_or(EngineError::NoPendingRumour)?;

        let rumour_id = rumour.id;
        let outcome = self.confirm_rumour(rumour).await?;
        Ok(outcome.map(|()| rumour_id))
    }

    /// Mark a pending rumour denied. No Transfer, no reputation change.
    ///
    /// Refused with `TransferRecorded` when an interrupted confirmation has
    /// already written the rumour's Transfer; that rumour can only be
    /// confirmed.
    pub async fn deny(&self, rumour_id: RumourId) -> EngineResult<()> {
        let rumour = self.load_rumour(rumour_id).await?;
        ensure_pending(&rumour)?;

        if let Some(transfer) = self.transfers.get_transfer_for_rumour(rumour_id).await? {
            debug!(rumour_id = %rumour_id, transfer_id = %transfer.id, "Denial refused, transfer already recorded");
            return Err(EngineError::TransferRecorded(rumour_id));
        }

        if !self
            .rumours
            .transition_status(rumour_id, RumourStatus::Pending, RumourStatus::Denied)
            .await?
        {
            return Err(self.lost_transition(rumour_id).await);
        }

        info!(rumour_id = %rumour_id, "Rumour denied");
        Ok(())
    }

    async fn confirm_rumour(&self, rumour: Rumour) -> EngineResult<Outcome<()>> {
        ensure_pending(&rumour)?;

        let transfer = self.record_transfer(&rumour).await?;

        match self
            .rumours
            .transition_status(rumour.id, RumourStatus::Pending, RumourStatus::Confirmed)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                let err = self.lost_transition(rumour.id).await;
                if matches!(err, EngineError::NotPending { status: RumourStatus::Denied, .. }) {
                    self.discard_transfer(rumour.id).await;
                }
                return Err(err);
            }
            Err(e) => {
                error!(
                    rumour_id = %rumour.id,
                    transfer_id = %transfer.id,
                    error = %e,
                    "Transfer recorded but rumour status update failed; confirm again to finish"
                );
                return Err(e.into());
            }
        }

        info!(
            rumour_id = %rumour.id,
            transfer_id = %transfer.id,
            category = transfer.category.as_str(),
            "Rumour confirmed"
        );

        let bonus = match rumour.creator_id {
            Some(creator) => {
                let delta = self.policy.points_for(PointEvent::RumourConfirmed);
                award_bonus(self.adjuster.as_ref(), creator, delta).await
            }
            None => BonusOutcome::Skipped(SkipReason::NoCreator),
        };

        Ok(Outcome::new((), bonus))
    }

    /// Insert the rumour's Transfer, or adopt one left by an interrupted run
    async fn record_transfer(&self, rumour: &Rumour) -> EngineResult<Transfer> {
        let transfer = Transfer::from_rumour(rumour);

        match self.transfers.insert_transfer(&transfer).await {
            Ok(()) => Ok(transfer),
            Err(e) if e.is_already_exists() => {
                let existing = self
                    .transfers
                    .get_transfer_for_rumour(rumour.id)
                    .await?
                    .ok_or(e)?;
                warn!(
                    rumour_id = %rumour.id,
                    transfer_id = %existing.id,
                    "Adopting transfer left by an interrupted confirmation"
                );
                Ok(existing)
            }
            Err(e) => {
                warn!(rumour_id = %rumour.id, error = %e, "Transfer insert failed, confirmation aborted");
                Err(e.into())
            }
        }
    }

    /// A denial won the race after our Transfer insert; a denied rumour
    /// must not keep one.
    async fn discard_transfer(&self, rumour_id: RumourId) {
        match self.transfers.delete_transfer_for_rumour(rumour_id).await {
            Ok(_) => warn!(rumour_id = %rumour_id, "Rumour denied during confirmation, transfer discarded"),
            Err(e) => error!(
                rumour_id = %rumour_id,
                error = %e,
                "Rumour denied during confirmation but its transfer could not be removed"
            ),
        }
    }

    async fn load_rumour(&self, rumour_id: RumourId) -> EngineResult<Rumour> {
        self.rumours
            .get_rumour(rumour_id)
            .await?
            .ok_or(EngineError::RumourNotFound(rumour_id))
    }

    /// A conditional status write found the rumour no longer pending
    async fn lost_transition(&self, rumour_id: RumourId) -> EngineError {
        match self.rumours.get_rumour(rumour_id).await {
            Ok(Some(rumour)) => EngineError::NotPending {
                id: rumour_id,
                status: rumour.status,
            },
            Ok(None) => EngineError::RumourNotFound(rumour_id),
            Err(e) => EngineError::Store(e),
        }
    }
}

fn ensure_pending(rumour: &Rumour) -> Result<(), EngineError> {
    if rumour.is_pending() {
        return Ok(());
    }
    debug!(rumour_id = %rumour.id, status = %rumour.status, "Rumour is not pending");
    Err(EngineError::NotPending {
        id: rumour.id,
        status: rumour.status,
    })
}
